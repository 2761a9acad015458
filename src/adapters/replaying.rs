//! Replaying adapter: serves recorded generator results from a cassette.

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::AtelierError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};

/// Serves recorded image generation results from a cassette.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(&self, _request: &GenerationRequest) -> GenerateFuture<'_> {
        let output = self
            .replayer
            .lock()
            .expect("replayer lock poisoned")
            .next_interaction("image_generator", "generate")
            .output;
        Box::pin(async move { replay_result(output) })
    }
}

/// Interpret a replayed output in `{"Ok": ...}` / `{"Err": ...}` form.
fn replay_result(output: serde_json::Value) -> Result<GeneratedImage, AtelierError> {
    if let Some(err_val) = output.get("Err") {
        let message = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(AtelierError::Api { status: 0, message });
    }
    let ok_val = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(ok_val).map_err(|e| AtelierError::Api {
        status: 0,
        message: format!("Malformed replayed output: {e}"),
    })
}
