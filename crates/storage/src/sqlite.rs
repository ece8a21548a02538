#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::PortError;
use crate::port::{ChangeListener, ListenerRegistry, StoragePort};

struct SqliteShared {
    conn: Mutex<Connection>,
    listeners: Mutex<ListenerRegistry>,
    next_handle: AtomicU64,
    storage_dir: PathBuf,
}

/// Durable port backed by a single-file sqlite database. Clones share the
/// connection and count as separate instances for change notification.
pub struct SqlitePort {
    shared: Arc<SqliteShared>,
    handle: u64,
}

impl SqlitePort {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, PortError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;
        let conn = Connection::open(storage_dir.join("pedigree_drafts.db"))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migrate(&conn)?;
        Ok(Self {
            shared: Arc::new(SqliteShared {
                conn: Mutex::new(conn),
                listeners: Mutex::new(ListenerRegistry::default()),
                next_handle: AtomicU64::new(1),
                storage_dir,
            }),
            handle: 0,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.shared.storage_dir
    }
}

impl Clone for SqlitePort {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            handle: self.shared.next_handle.fetch_add(1, Ordering::Relaxed),
        }
    }
}

fn migrate(conn: &Connection) -> Result<(), PortError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS drafts (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", "v1"],
    )?;
    Ok(())
}

impl StoragePort for SqlitePort {
    fn read(&self, key: &str) -> Result<Option<String>, PortError> {
        let conn = self.shared.conn.lock().expect("sqlite port mutex poisoned");
        let value = conn
            .query_row(
                "SELECT value FROM drafts WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PortError> {
        {
            let conn = self.shared.conn.lock().expect("sqlite port mutex poisoned");
            conn.execute(
                "INSERT INTO drafts(key, value, updated_at_ms) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at_ms=excluded.updated_at_ms",
                params![key, value, now_ms()],
            )?;
        }
        let fired = {
            let listeners = self
                .shared
                .listeners
                .lock()
                .expect("sqlite listener mutex poisoned");
            listeners.for_write(self.handle)
        };
        for listener in fired {
            listener(key);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        let mut listeners = self
            .shared
            .listeners
            .lock()
            .expect("sqlite listener mutex poisoned");
        listeners.register(self.handle, listener);
    }
}

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}
