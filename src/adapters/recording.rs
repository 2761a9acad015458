//! Recording adapter: captures generator interactions to a cassette while
//! delegating to an inner implementation.

use std::sync::{Arc, Mutex};

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_generator::{GenerateFuture, GenerationRequest, ImageGenerator};

/// Records image generation interactions while delegating to an inner
/// implementation.
pub struct RecordingImageGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.generate(&request).await;

            let input =
                serde_json::to_value(&request).expect("failed to serialize recording input");
            let output = match &result {
                Ok(image) => {
                    let inner =
                        serde_json::to_value(image).expect("failed to serialize Ok value");
                    serde_json::json!({ "Ok": inner })
                }
                Err(e) => serde_json::json!({ "Err": e.to_string() }),
            };
            recorder
                .lock()
                .expect("recorder lock poisoned")
                .record("image_generator", "generate", input, output);

            result
        })
    }
}
