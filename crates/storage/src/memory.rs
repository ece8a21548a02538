#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::PortError;
use crate::port::{ChangeListener, ListenerRegistry, StoragePort};

#[derive(Default)]
struct MemoryShared {
    values: BTreeMap<String, String>,
    listeners: ListenerRegistry,
    next_handle: u64,
}

/// In-memory port for tests and ephemeral sessions. Clones share the
/// backing map while keeping distinct handle identities, so two clones
/// notify each other exactly like two tabs over shared storage.
pub struct MemoryPort {
    shared: Arc<Mutex<MemoryShared>>,
    handle: u64,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(MemoryShared {
                next_handle: 1,
                ..MemoryShared::default()
            })),
            handle: 0,
        }
    }
}

impl Default for MemoryPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryPort {
    fn clone(&self) -> Self {
        let mut shared = self.shared.lock().expect("memory port mutex poisoned");
        let handle = shared.next_handle;
        shared.next_handle += 1;
        drop(shared);
        Self {
            shared: Arc::clone(&self.shared),
            handle,
        }
    }
}

impl StoragePort for MemoryPort {
    fn read(&self, key: &str) -> Result<Option<String>, PortError> {
        let shared = self.shared.lock().expect("memory port mutex poisoned");
        Ok(shared.values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PortError> {
        // Collect before firing so listeners can re-enter the port.
        let fired = {
            let mut shared = self.shared.lock().expect("memory port mutex poisoned");
            shared.values.insert(key.to_string(), value.to_string());
            shared.listeners.for_write(self.handle)
        };
        for listener in fired {
            listener(key);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        let mut shared = self.shared.lock().expect("memory port mutex poisoned");
        shared.listeners.register(self.handle, listener);
    }
}
