//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default model identifier used when the config file names none.
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// History storage configuration.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Generation parameters from the config file.
#[derive(Debug, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier to generate with.
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string() }
    }
}

/// History storage configuration.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryConfig {
    /// Directory the history log is stored under.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variable.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY").ok().or_else(|| self.keys.gemini.clone())
    }

    /// Directory the history log lives in, using the resolution order:
    /// 1. `ATELIER_DATA_DIR` environment variable
    /// 2. `[history] dir` from the config file
    /// 3. `~/.local/share/atelier`
    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var("ATELIER_DATA_DIR") {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.history.dir {
            return dir.clone();
        }
        default_data_dir()
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `ATELIER_CONFIG` environment variable
/// 3. `~/.config/atelier/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("ATELIER_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/atelier/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/atelier/config.toml")
    } else {
        PathBuf::from("atelier.toml")
    }
}

/// Default data dir: `~/.local/share/atelier`.
fn default_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local/share/atelier")
    } else {
        PathBuf::from(".atelier")
    }
}
