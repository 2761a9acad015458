//! Generation session: the request lifecycle state machine.
//!
//! A session holds exactly one [`SessionState`] and drives at most one
//! generation at a time. Submitting moves the state through
//! `Loading` to `Succeeded` or `Failed`; the submitted request is retained
//! in both terminal states so [`GenerationSession::regenerate`] can replay
//! the captured inputs, not whatever the caller's draft has become since.

use tracing::{debug, warn};

use crate::error::AtelierError;
use crate::history::{HistoryRecord, HistoryStore};
use crate::ports::image_generator::{GeneratedImage, GenerationRequest, ImageGenerator};

/// Why a submission ended in [`SessionState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No API credential is configured; the generation call was never made.
    MissingCredential,
    /// The generation call failed. All causes (network, quota, malformed
    /// response) collapse into this one category.
    Generation,
}

/// Lifecycle state of the current (or most recent) generation.
#[derive(Debug)]
pub enum SessionState {
    /// No submission has been made yet.
    Idle,
    /// A generation call is in flight.
    Loading {
        /// The request being generated.
        request: GenerationRequest,
    },
    /// The most recent submission produced an image.
    Succeeded {
        /// The generated image.
        image: GeneratedImage,
        /// The request that produced it.
        request: GenerationRequest,
    },
    /// The most recent submission failed.
    Failed {
        /// Failure classification.
        kind: FailureKind,
        /// The request that was attempted.
        request: GenerationRequest,
    },
}

/// Coordinates a single in-flight generation and records successes.
///
/// `generator` is `None` when no API credential is configured; submissions
/// then fail with [`FailureKind::MissingCredential`] without any call being
/// attempted.
pub struct GenerationSession {
    generator: Option<Box<dyn ImageGenerator>>,
    history: HistoryStore,
    state: SessionState,
}

impl GenerationSession {
    /// Create an idle session.
    #[must_use]
    pub fn new(generator: Option<Box<dyn ImageGenerator>>, history: HistoryStore) -> Self {
        Self { generator, history, state: SessionState::Idle }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The request captured by the last terminal state, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<&GenerationRequest> {
        match &self.state {
            SessionState::Succeeded { request, .. } | SessionState::Failed { request, .. } => {
                Some(request)
            }
            SessionState::Idle | SessionState::Loading { .. } => None,
        }
    }

    /// Submit a request for generation.
    ///
    /// A prompt that is empty after trimming is a silent no-op: the state
    /// is left untouched and no error is surfaced. On success the result is
    /// appended to the history store before the state becomes `Succeeded`;
    /// the append never happens speculatively. A failed append is logged
    /// and does not demote the success.
    ///
    /// # Errors
    ///
    /// Returns [`AtelierError::AlreadyInProgress`] if a generation is
    /// already in flight. Generation failures do not surface here; they
    /// land in [`SessionState::Failed`].
    pub async fn submit(&mut self, request: GenerationRequest) -> Result<(), AtelierError> {
        if request.prompt.trim().is_empty() {
            debug!("ignoring submission with empty prompt");
            return Ok(());
        }
        if matches!(self.state, SessionState::Loading { .. }) {
            return Err(AtelierError::AlreadyInProgress);
        }

        let Some(generator) = self.generator.as_deref() else {
            warn!("no API credential configured, submission not attempted");
            self.state =
                SessionState::Failed { kind: FailureKind::MissingCredential, request };
            return Ok(());
        };

        self.state = SessionState::Loading { request: request.clone() };

        match generator.generate(&request).await {
            Ok(image) => {
                let record = HistoryRecord::new(&request.prompt, &image);
                if let Err(e) = self.history.append(record) {
                    warn!(error = %e, "generated image could not be recorded in history");
                }
                self.state = SessionState::Succeeded { image, request };
            }
            Err(e) => {
                debug!(error = %e, "generation call failed");
                self.state = SessionState::Failed { kind: FailureKind::Generation, request };
            }
        }
        Ok(())
    }

    /// Re-submit the request captured by the last terminal state.
    ///
    /// Uses the exact request value from the prior `Succeeded` or `Failed`
    /// state. Silent no-op when no prior submission exists.
    ///
    /// # Errors
    ///
    /// Returns [`AtelierError::AlreadyInProgress`] if a generation is
    /// already in flight.
    pub async fn regenerate(&mut self) -> Result<(), AtelierError> {
        let Some(request) = self.last_request().cloned() else {
            return Ok(());
        };
        self.submit(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::adapters::storage::memory::MemoryStore;
    use crate::ports::image_generator::{AspectRatio, GenerateFuture, ReferenceImage};

    /// Test generator that counts calls, captures prompts, and returns a
    /// canned result.
    struct StubGenerator {
        calls: Arc<AtomicUsize>,
        prompts: Arc<Mutex<Vec<String>>>,
        result: Result<Vec<u8>, ()>,
    }

    impl StubGenerator {
        fn succeeding(data: &[u8]) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let prompts = Arc::new(Mutex::new(Vec::new()));
            let stub = Self {
                calls: Arc::clone(&calls),
                prompts: Arc::clone(&prompts),
                result: Ok(data.to_vec()),
            };
            (stub, calls, prompts)
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = Self {
                calls: Arc::clone(&calls),
                prompts: Arc::new(Mutex::new(Vec::new())),
                result: Err(()),
            };
            (stub, calls)
        }
    }

    impl ImageGenerator for StubGenerator {
        fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            let result = self.result.clone();
            Box::pin(async move {
                match result {
                    Ok(data) => Ok(GeneratedImage { data, mime_type: "image/jpeg".into() }),
                    Err(()) => Err(AtelierError::Api {
                        status: 500,
                        message: "stub failure".into(),
                    }),
                }
            })
        }
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.into(),
            reference_images: Vec::new(),
            aspect_ratio: AspectRatio::Square,
        }
    }

    /// A history store for the session plus an independent reader over the
    /// same backing map, so tests can observe what the session persisted.
    fn history_pair() -> (HistoryStore, HistoryStore) {
        let backing = MemoryStore::new();
        let writer = HistoryStore::new(Box::new(backing.clone()));
        let reader = HistoryStore::new(Box::new(backing));
        (writer, reader)
    }

    #[tokio::test]
    async fn submit_success_records_history_and_state() {
        let (stub, calls, _) = StubGenerator::succeeding(b"IMG1");
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("a red fox")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match session.state() {
            SessionState::Succeeded { image, request } => {
                assert_eq!(image.data, b"IMG1");
                assert_eq!(request.prompt, "a red fox");
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }

        let log = reader.list();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].prompt, "a red fox");
        assert_eq!(log[0].image_data, b"IMG1");
    }

    #[tokio::test]
    async fn empty_prompt_is_a_silent_no_op() {
        let (stub, calls, _) = StubGenerator::succeeding(b"IMG1");
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("   \t\n")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(session.state(), SessionState::Idle));
        assert!(reader.list().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(None, history);

        session.submit(request("a cat")).await.unwrap();

        match session.state() {
            SessionState::Failed { kind, request } => {
                assert_eq!(*kind, FailureKind::MissingCredential);
                assert_eq!(request.prompt, "a cat");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(reader.list().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_lands_in_failed_state() {
        let (stub, calls) = StubGenerator::failing();
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("a cat")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            session.state(),
            SessionState::Failed { kind: FailureKind::Generation, .. }
        ));
        assert!(reader.list().is_empty(), "failures must not be recorded");
    }

    #[tokio::test]
    async fn submit_while_loading_is_rejected_without_a_call() {
        let (stub, calls, _) = StubGenerator::succeeding(b"IMG1");
        let (history, _reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);
        session.state = SessionState::Loading { request: request("in flight") };

        let err = session.submit(request("another")).await.unwrap_err();

        assert!(matches!(err, AtelierError::AlreadyInProgress));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(session.state(), SessionState::Loading { .. }));
    }

    #[tokio::test]
    async fn regenerate_reuses_the_captured_request() {
        let (stub, calls, prompts) = StubGenerator::succeeding(b"IMG1");
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("prompt A")).await.unwrap();
        // The caller edits its draft to "prompt B" but never resubmits;
        // regenerate must replay "prompt A".
        session.regenerate().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*prompts.lock().unwrap(), vec!["prompt A", "prompt A"]);
        assert_eq!(reader.list().len(), 2);
    }

    #[tokio::test]
    async fn regenerate_retries_after_failure() {
        let (stub, calls) = StubGenerator::failing();
        let (history, _reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("flaky")).await.unwrap();
        session.regenerate().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match session.state() {
            SessionState::Failed { request, .. } => assert_eq!(request.prompt, "flaky"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn regenerate_without_prior_submission_is_a_no_op() {
        let (stub, calls, _) = StubGenerator::succeeding(b"IMG1");
        let (history, _reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.regenerate().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(session.state(), SessionState::Idle));
    }

    #[tokio::test]
    async fn regenerate_preserves_reference_images_and_ratio() {
        let (stub, _, _) = StubGenerator::succeeding(b"IMG1");
        let (history, _reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        let original = GenerationRequest {
            prompt: "with refs".into(),
            reference_images: vec![ReferenceImage {
                id: "ref-1".into(),
                name: "sketch.png".into(),
                data: vec![9, 9, 9],
                mime_type: "image/png".into(),
            }],
            aspect_ratio: AspectRatio::Landscape,
        };
        session.submit(original).await.unwrap();
        session.regenerate().await.unwrap();

        let captured = session.last_request().unwrap();
        assert_eq!(captured.reference_images.len(), 1);
        assert_eq!(captured.reference_images[0].data, vec![9, 9, 9]);
        assert_eq!(captured.aspect_ratio, AspectRatio::Landscape);
    }

    #[tokio::test]
    async fn successive_submissions_prepend_newest_first() {
        let (stub, _, _) = StubGenerator::succeeding(b"IMG1");
        let (history, reader) = history_pair();
        let mut session = GenerationSession::new(Some(Box::new(stub)), history);

        session.submit(request("first")).await.unwrap();
        session.submit(request("second")).await.unwrap();

        let prompts: Vec<_> = reader.list().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, ["second", "first"]);
    }
}
