#![forbid(unsafe_code)]

use std::sync::Arc;

use crate::PortError;

/// Listener invoked with the written key whenever a *different* handle of
/// the same port writes. Subscribers filter by key themselves, the way a
/// browser tab filters storage events.
pub type ChangeListener = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// Keyed blob storage behind the draft overlay. One clone of a port plays
/// the role of one application instance: clones share the backing data but
/// never receive notifications for their own writes.
pub trait StoragePort: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PortError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PortError>;
    fn subscribe(&self, listener: ChangeListener);
}

pub(crate) struct ListenerEntry {
    handle: u64,
    listener: ChangeListener,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    pub(crate) fn register(&mut self, handle: u64, listener: ChangeListener) {
        self.entries.push(ListenerEntry { handle, listener });
    }

    /// Listeners to fire for a write performed by `writer`: everyone else's.
    pub(crate) fn for_write(&self, writer: u64) -> Vec<ChangeListener> {
        self.entries
            .iter()
            .filter(|entry| entry.handle != writer)
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }
}
