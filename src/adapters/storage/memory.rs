//! In-memory key-value store for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AtelierError;
use crate::ports::KeyValueStore;

/// Map-backed store. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, AtelierError> {
        Ok(self.entries.lock().expect("store lock poisoned").get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AtelierError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
