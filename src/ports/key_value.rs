//! Key-value store port for device-local durable state.
//!
//! The history log lives under a single fixed key; a write replaces the
//! whole value, and readers never observe a partial write.

use crate::error::AtelierError;

/// A device-local string store addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, AtelierError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), AtelierError>;
}
