//! Disk-backed key-value store: one file per key under a data directory.

use std::path::PathBuf;

use crate::error::AtelierError;
use crate::ports::KeyValueStore;

/// Stores each key as `<root>/<key>.json`.
///
/// The root directory is created on first write. Writes replace the whole
/// file; there is no locking, so the store assumes a single writer at a
/// time (one process).
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for DiskStore {
    fn read(&self, key: &str) -> Result<Option<String>, AtelierError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AtelierError::Storage(format!("failed to read key '{key}': {e}"))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AtelierError> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            AtelierError::Storage(format!(
                "failed to create data dir {}: {e}",
                self.root.display()
            ))
        })?;
        std::fs::write(self.path_for(key), value)
            .map_err(|e| AtelierError::Storage(format!("failed to write key '{key}': {e}")))
    }
}
