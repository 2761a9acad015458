//! Durable, bounded history of successful generations.
//!
//! The log is an ordered sequence of records, newest first, serialized as
//! JSON under one fixed key of a [`KeyValueStore`]. Insertion prepends and
//! silently evicts from the tail once the log holds [`HISTORY_CAPACITY`]
//! records. The log is re-read from the store on every operation; corrupt
//! or unreadable content is treated as an empty log, never as an error.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AtelierError;
use crate::ports::image_generator::GeneratedImage;
use crate::ports::KeyValueStore;

/// Maximum number of records retained in the log.
pub const HISTORY_CAPACITY: usize = 50;

/// Fixed key under which the serialized log is stored.
const HISTORY_KEY: &str = "generation_history";

/// One persisted generation: the prompt and the image it produced.
///
/// Created exactly once, when a generation succeeds; immutable thereafter
/// except for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique identifier, stable for the lifetime of the record.
    pub id: String,
    /// The prompt the image was generated from.
    pub prompt: String,
    /// Raw image bytes.
    #[serde(with = "crate::ports::image_generator::base64_bytes")]
    pub image_data: Vec<u8>,
    /// Encoding tag for `image_data` (e.g., `"image/jpeg"`).
    pub mime_type: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: i64,
}

impl HistoryRecord {
    /// Build a fresh record from a prompt and a generated image.
    #[must_use]
    pub fn new(prompt: &str, image: &GeneratedImage) -> Self {
        Self {
            id: format!("hist-{}", Uuid::new_v4()),
            prompt: prompt.to_string(),
            image_data: image.data.clone(),
            mime_type: image.mime_type.clone(),
            created_at_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// Bounded newest-first log of [`HistoryRecord`]s over a key-value store.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
}

impl HistoryStore {
    /// Create a history store over the given backing store.
    #[must_use]
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Prepend `record`, evict past capacity, and persist before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting log cannot be persisted.
    pub fn append(&self, record: HistoryRecord) -> Result<(), AtelierError> {
        let mut log = self.load();
        log.insert(0, record);
        log.truncate(HISTORY_CAPACITY);
        self.persist(&log)
    }

    /// Remove the record with the given id, if present.
    ///
    /// Removing an absent id persists an unchanged log and is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting log cannot be persisted.
    pub fn remove(&self, id: &str) -> Result<(), AtelierError> {
        let mut log = self.load();
        log.retain(|record| record.id != id);
        self.persist(&log)
    }

    /// The full current log, newest first, read from the store at call time.
    #[must_use]
    pub fn list(&self) -> Vec<HistoryRecord> {
        self.load()
    }

    fn load(&self) -> Vec<HistoryRecord> {
        let raw = match self.store.read(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read history, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(e) => {
                debug!(error = %e, "stored history is not deserializable, resetting to empty");
                Vec::new()
            }
        }
    }

    fn persist(&self, log: &[HistoryRecord]) -> Result<(), AtelierError> {
        let raw = serde_json::to_string(log)
            .map_err(|e| AtelierError::Storage(format!("failed to serialize history: {e}")))?;
        self.store.write(HISTORY_KEY, &raw)
    }
}
