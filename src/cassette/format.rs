//! Cassette file format and loading.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::replayer::CassetteReplayer;

/// A recorded run: metadata plus the ordered interactions it captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable name of the recording.
    pub name: String,
    /// When the recording was made.
    pub recorded_at: DateTime<Utc>,
    /// The model the interactions were recorded against.
    pub model: String,
    /// Captured interactions, in call order.
    pub interactions: Vec<Interaction>,
}

/// One captured port call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording, starting at 0.
    pub seq: u64,
    /// Port the call went through (e.g., `"image_generator"`).
    pub port: String,
    /// Method name on the port.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized call output, in `{"Ok": ...}` / `{"Err": ...}` form.
    pub output: serde_json::Value,
}

/// Load a cassette file and create a replayer over it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    Ok(CassetteReplayer::new(&cassette))
}
