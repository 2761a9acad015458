//! Service context that wires ports to their adapters.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::gemini::GeminiGenerator;
use crate::adapters::recording::RecordingImageGenerator;
use crate::adapters::replaying::ReplayingImageGenerator;
use crate::adapters::storage::disk::DiskStore;
use crate::cassette::format::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::AtelierError;
use crate::history::HistoryStore;
use crate::ports::ImageGenerator;

/// Bundles the generator port and the history store.
///
/// `generator` is `None` when no API credential is configured; the session
/// then reports the missing credential per submission instead of this
/// module failing at startup.
pub struct ServiceContext {
    /// Image generator port, absent without a credential.
    pub generator: Option<Box<dyn ImageGenerator>>,
    /// Durable history store.
    pub history: HistoryStore,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<std::path::PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context. Without an API key the generator is absent
    /// and submissions fail with the missing-credential state.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        let generator: Option<Box<dyn ImageGenerator>> = config
            .gemini_key()
            .map(|key| {
                Box::new(GeminiGenerator::new(key, config.generation.model.clone()))
                    as Box<dyn ImageGenerator>
            });
        Self { generator, history: history_store(config) }
    }

    /// Create a recording context that wraps the live adapter with a
    /// recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured; recording requires a
    /// live call to capture.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), AtelierError> {
        let live = Self::live(config);
        let Some(inner) = live.generator else {
            return Err(AtelierError::MissingApiKey { env_var: "GEMINI_API_KEY".into() });
        };

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = std::path::PathBuf::from(".atelier/cassettes")
            .join(&timestamp)
            .join("image_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_generator"),
            &config.generation.model,
        )));

        let generator = RecordingImageGenerator::new(inner, Arc::clone(&recorder));
        let ctx =
            Self { generator: Some(Box::new(generator)), history: live.history };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path, config: &Config) -> Result<Self, AtelierError> {
        let replayer = load_cassette(path)
            .map_err(|e| AtelierError::Config(format!("Failed to load cassette: {e}")))?;
        let generator = ReplayingImageGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { generator: Some(Box::new(generator)), history: history_store(config) })
    }
}

/// Build the disk-backed history store from config.
pub fn history_store(config: &Config) -> HistoryStore {
    HistoryStore::new(Box::new(DiskStore::new(config.history_dir())))
}
