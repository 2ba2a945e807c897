use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::CutoutConfig;
use crate::error::{CutoutError, LastError, WorkflowError};
use crate::resources::{Handle, HandleStore, Resolved};
use crate::service::{RemovalRequest, RemovalService, RemovedImage};
use crate::source::SourceFile;
use crate::state_machine::{Event, SourceSummary, StateMachine, Status, WorkflowSnapshot};
use crate::validator::{ValidationPolicy, validate};

/// Drives one image through select → submit → result, one request at a time.
///
/// All operations take `&self`: a caller may `reset` or `select_file` while a
/// `submit` future is pending, which supersedes that submission. The state
/// lock is never held across an `.await`.
pub struct Workflow<S> {
    service: S,
    policy: ValidationPolicy,
    request_timeout: Duration,
    handles: HandleStore,
    state: Mutex<WorkflowState>,
}

#[derive(Debug, Default)]
struct WorkflowState {
    status: Status,
    source: Option<SourceFile>,
    preview: Option<Handle>,
    result: Option<Handle>,
    last_error: Option<LastError>,
    attempts: u32,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    /// Bumped whenever an in-flight submission is superseded; outcomes
    /// carrying an older generation are dropped.
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl WorkflowState {
    fn apply(&mut self, event: Event) {
        match StateMachine::next(self.status, event) {
            Some(next) => {
                if next != self.status {
                    info!(from = %self.status, to = %next, ?event, "workflow transition");
                }
                self.status = next;
            }
            None => warn!(status = %self.status, ?event, "ignoring invalid transition"),
        }
    }

    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

/// Fails the submission it guards if the `submit` future is dropped before
/// reaching an outcome, so the workflow is never left in `Submitting`.
struct InFlight<'a> {
    state: &'a Mutex<WorkflowState>,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != self.generation {
            return;
        }
        let err = WorkflowError::Abandoned;
        warn!(error = %err, "submit dropped while in flight");
        state.in_flight = None;
        state.completed_at = Some(Utc::now());
        state.last_error = Some(LastError::from(&err));
        state.apply(Event::Failed);
    }
}

impl<S: RemovalService> Workflow<S> {
    pub fn new(service: S, config: &CutoutConfig) -> Self {
        Self {
            service,
            policy: config.policy(),
            request_timeout: config.request_timeout(),
            handles: HandleStore::new(),
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release_handles(&self, state: &mut WorkflowState) {
        if let Some(preview) = state.preview.take() {
            self.handles.release(preview);
        }
        if let Some(result) = state.result.take() {
            self.handles.release(result);
        }
    }

    /// Validate `file` and make it the source.
    ///
    /// A rejected file leaves the current source, preview and status alone,
    /// but a result produced from the previous file is released as stale.
    pub fn select_file(&self, file: SourceFile) -> Result<(), WorkflowError> {
        let verdict = validate(&file, &self.policy);
        let mut state = self.lock();

        if let Err(rejection) = verdict {
            warn!(file = file.name(), %rejection, "file rejected");
            if let Some(result) = state.result.take() {
                self.handles.release(result);
                state.apply(Event::ResultDiscarded);
            }
            return Err(rejection.into());
        }

        info!(
            file = file.name(),
            media_type = file.media_type(),
            size = file.size(),
            "file accepted"
        );
        state.supersede();
        self.release_handles(&mut state);
        state.preview = Some(self.handles.derive_preview(&file));
        state.source = Some(file);
        state.last_error = None;
        state.attempts = 0;
        state.submitted_at = None;
        state.completed_at = None;
        state.apply(Event::FileAccepted);
        Ok(())
    }

    /// Send the current source to the service and wait for the outcome.
    ///
    /// Returns the final status on success. Request-phase failures are both
    /// recorded as `last_error` and returned. Dropping the returned future
    /// mid-flight fails the submission with [`WorkflowError::Abandoned`]. If the submission is superseded
    /// by `reset`/`select_file`, its outcome is dropped and
    /// [`WorkflowError::Superseded`] is returned.
    pub async fn submit(&self) -> Result<Status, WorkflowError> {
        let (source, generation, token) = {
            let mut state = self.lock();
            let Some(source) = state.source.clone() else {
                return Err(WorkflowError::NoFileSelected);
            };
            if state.status == Status::Submitting {
                return Err(WorkflowError::AlreadyInProgress);
            }

            if let Some(result) = state.result.take() {
                self.handles.release(result);
            }
            state.last_error = None;
            state.generation += 1;
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            state.attempts += 1;
            state.submitted_at = Some(Utc::now());
            state.completed_at = None;
            state.apply(Event::Submit);
            (source, state.generation, token)
        };

        let mut guard = InFlight {
            state: &self.state,
            generation,
            armed: true,
        };
        let outcome = tokio::select! {
            _ = token.cancelled() => None,
            outcome = timeout(self.request_timeout, self.process(&source)) => Some(outcome),
        };
        guard.disarm();

        let mut state = self.lock();
        let outcome = match outcome {
            Some(outcome) if state.generation == generation => outcome,
            _ => {
                warn!(file = source.name(), "dropping superseded submission");
                return Err(WorkflowError::Superseded);
            }
        };
        state.in_flight = None;
        state.completed_at = Some(Utc::now());

        let outcome = outcome.unwrap_or_else(|_| {
            Err(WorkflowError::Timeout {
                secs: self.request_timeout.as_secs(),
            })
        });
        match outcome {
            Ok(image) => {
                let handle = self.handles.materialize_result(image.bytes, &image.media_type);
                state.result = Some(handle);
                state.apply(Event::Succeeded);
                Ok(state.status)
            }
            Err(err) => {
                warn!(file = source.name(), error = %err, "submission failed");
                if err.is_request_phase() {
                    state.last_error = Some(LastError::from(&err));
                }
                state.apply(Event::Failed);
                Err(err)
            }
        }
    }

    /// Encode then send. The request is only issued if encoding succeeds.
    async fn process(&self, source: &SourceFile) -> Result<RemovedImage, WorkflowError> {
        let payload = self.handles.encode_for_transfer(source).await?;
        let request = RemovalRequest::new(&payload);
        Ok(self.service.remove_background(&request).await?)
    }

    /// Back to `Idle`, releasing every handle. Safe to call repeatedly.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.supersede();
        self.release_handles(&mut state);
        state.source = None;
        state.last_error = None;
        state.attempts = 0;
        state.submitted_at = None;
        state.completed_at = None;
        state.apply(Event::Reset);
    }

    /// Write the result to `dest` (a file path, or a directory to receive a
    /// generated name). Does not change the workflow.
    pub async fn export_result(&self, dest: &Path) -> Result<PathBuf, CutoutError> {
        let handle = self.lock().result.ok_or(CutoutError::NoResult)?;
        self.handles.export(handle, dest).await
    }

    pub fn resolve(&self, handle: Handle) -> Option<Resolved> {
        self.handles.resolve(handle)
    }

    pub fn status(&self) -> Status {
        self.lock().status
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.lock();
        WorkflowSnapshot {
            status: state.status,
            source: state.source.as_ref().map(SourceSummary::from),
            preview: state.preview,
            result: state.result,
            last_error: state.last_error.clone(),
            attempts: state.attempts,
            submitted_at: state.submitted_at,
            completed_at: state.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::service::ApiError;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::task::Poll;
    use tokio::sync::Notify;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nsource";
    const CUT: &[u8] = b"\x89PNG\r\n\x1a\ncut-out";

    #[derive(Default)]
    struct MockService {
        outcomes: Mutex<VecDeque<Result<RemovedImage, ApiError>>>,
        requests: Mutex<Vec<RemovalRequest>>,
        gate: Option<Arc<Notify>>,
        /// The first `hang_calls` requests never answer.
        hang_calls: usize,
    }

    impl MockService {
        fn returning(outcomes: impl IntoIterator<Item = Result<RemovedImage, ApiError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                ..Default::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn hanging() -> Self {
            Self::default().hanging_first(usize::MAX)
        }

        fn hanging_first(mut self, calls: usize) -> Self {
            self.hang_calls = calls;
            self
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl RemovalService for MockService {
        async fn remove_background(
            &self,
            req: &RemovalRequest,
        ) -> Result<RemovedImage, ApiError> {
            let call = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(req.clone());
                requests.len()
            };
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if call <= self.hang_calls {
                std::future::pending::<()>().await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ApiError::Status {
                        status: 500,
                        message: "no scripted outcome".into(),
                    })
                })
        }
    }

    fn ok(bytes: &[u8]) -> Result<RemovedImage, ApiError> {
        Ok(RemovedImage {
            bytes: bytes.to_vec(),
            media_type: "image/png".into(),
        })
    }

    fn png() -> SourceFile {
        SourceFile::from_bytes("photo.png", "image/png", PNG.to_vec())
    }

    fn workflow(service: MockService) -> Workflow<MockService> {
        Workflow::new(service, &CutoutConfig::default())
    }

    async fn result_bytes(wf: &Workflow<MockService>) -> Vec<u8> {
        let handle = wf.snapshot().result.expect("result handle");
        wf.resolve(handle).unwrap().bytes().await.unwrap().to_vec()
    }

    #[test]
    fn oversized_file_is_rejected_without_state_change() {
        let wf = Workflow::new(
            MockService::default(),
            &CutoutConfig {
                max_file_size: 4,
                ..Default::default()
            },
        );
        let before = wf.snapshot();

        let err = wf.select_file(png()).unwrap_err();
        assert!(matches!(err, WorkflowError::FileTooLarge { max: 4, .. }));
        assert_eq!(wf.snapshot(), before);
        assert_eq!(wf.handles().live_count(), 0);
    }

    #[test]
    fn non_image_is_rejected() {
        let wf = workflow(MockService::default());
        let err = wf
            .select_file(SourceFile::from_bytes("notes.txt", "text/plain", b"hi".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFileType);
        assert_eq!(wf.status(), Status::Idle);
    }

    #[test]
    fn valid_selection_derives_preview() {
        let wf = workflow(MockService::default());
        wf.select_file(png()).unwrap();

        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Validated);
        assert!(snap.preview.is_some());
        assert!(snap.result.is_none());
        assert_eq!(snap.source.unwrap().name, "photo.png");
    }

    #[tokio::test]
    async fn submit_without_file_is_rejected() {
        let wf = workflow(MockService::default());
        assert_eq!(wf.submit().await, Err(WorkflowError::NoFileSelected));
        assert_eq!(wf.status(), Status::Idle);
        assert_eq!(wf.service().calls(), 0);
    }

    #[tokio::test]
    async fn success_materializes_result() {
        let wf = workflow(MockService::returning([ok(CUT)]));
        wf.select_file(png()).unwrap();

        assert_eq!(wf.submit().await, Ok(Status::Succeeded));
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Succeeded);
        assert!(snap.last_error.is_none());
        assert_eq!(snap.attempts, 1);
        assert!(snap.duration_ms().is_some());
        assert_eq!(result_bytes(&wf).await, CUT);
    }

    #[tokio::test]
    async fn payload_is_plain_base64_of_source() {
        let wf = workflow(MockService::returning([ok(CUT)]));
        wf.select_file(png()).unwrap();
        wf.submit().await.unwrap();

        let requests = wf.service().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        use base64::Engine as _;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&requests[0].image)
            .unwrap();
        assert_eq!(decoded, PNG);
    }

    #[tokio::test]
    async fn forbidden_fails_with_invalid_credential() {
        let wf = workflow(MockService::returning([Err(ApiError::InvalidCredential {
            message: "Invalid API Key".into(),
        })]));
        wf.select_file(png()).unwrap();

        assert_eq!(wf.submit().await, Err(WorkflowError::InvalidCredential));
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Failed);
        assert_eq!(snap.last_error.unwrap().kind, ErrorKind::InvalidCredential);
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn bad_request_fails_with_invalid_image() {
        let wf = workflow(MockService::returning([Err(ApiError::InvalidImage {
            message: "cannot identify image file".into(),
        })]));
        wf.select_file(png()).unwrap();

        wf.submit().await.unwrap_err();
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Failed);
        assert_eq!(snap.last_error.unwrap().kind, ErrorKind::InvalidImage);
    }

    #[tokio::test]
    async fn server_error_keeps_status_code() {
        let wf = workflow(MockService::returning([Err(ApiError::Status {
            status: 502,
            message: "Bad Gateway".into(),
        })]));
        wf.select_file(png()).unwrap();

        wf.submit().await.unwrap_err();
        assert_eq!(
            wf.snapshot().last_error.unwrap().kind,
            ErrorKind::ServiceError(502)
        );
    }

    #[tokio::test]
    async fn unreadable_source_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, PNG).unwrap();
        let source = SourceFile::from_path(&path).await.unwrap();

        let wf = workflow(MockService::returning([ok(CUT)]));
        wf.select_file(source).unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = wf.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadError);
        assert_eq!(wf.status(), Status::Failed);
        assert_eq!(wf.service().calls(), 0);
    }

    #[tokio::test]
    async fn source_grown_after_selection_is_never_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8; 10]).unwrap();

        let wf = Workflow::new(
            MockService::returning([ok(CUT)]),
            &CutoutConfig {
                max_file_size: 16,
                ..Default::default()
            },
        );
        wf.select_file(SourceFile::from_path(&path).await.unwrap())
            .unwrap();
        std::fs::write(&path, [1u8; 1000]).unwrap();

        let err = wf.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadError);
        assert_eq!(wf.service().calls(), 0);
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Failed);
        assert_eq!(snap.source.unwrap().size, 10);
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected() {
        let gate = Arc::new(Notify::new());
        let wf = workflow(MockService::returning([ok(CUT)]).gated(Arc::clone(&gate)));
        wf.select_file(png()).unwrap();

        let (first, second) = tokio::join!(wf.submit(), async {
            tokio::task::yield_now().await;
            let second = wf.submit().await;
            gate.notify_one();
            second
        });

        assert_eq!(first, Ok(Status::Succeeded));
        assert_eq!(second, Err(WorkflowError::AlreadyInProgress));
        assert_eq!(wf.service().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_service_times_out() {
        let wf = Workflow::new(
            MockService::hanging(),
            &CutoutConfig {
                request_timeout_secs: 5,
                ..Default::default()
            },
        );
        wf.select_file(png()).unwrap();

        assert_eq!(wf.submit().await, Err(WorkflowError::Timeout { secs: 5 }));
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Failed);
        assert_eq!(snap.last_error.unwrap().kind, ErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_fails_and_allows_resubmit() {
        let wf = workflow(MockService::returning([ok(CUT)]).hanging_first(1));
        wf.select_file(png()).unwrap();

        let abandoned = tokio::time::timeout(Duration::from_millis(50), wf.submit()).await;
        assert!(abandoned.is_err(), "submit should still be pending");

        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Failed);
        assert_eq!(snap.last_error.unwrap().kind, ErrorKind::Abandoned);
        assert!(snap.completed_at.is_some());

        assert_eq!(wf.submit().await, Ok(Status::Succeeded));
        assert_eq!(wf.service().calls(), 2);
        assert_eq!(result_bytes(&wf).await, CUT);
    }

    #[tokio::test]
    async fn dropped_superseded_submit_leaves_new_selection_alone() {
        let gate = Arc::new(Notify::new());
        let wf = workflow(MockService::returning([ok(CUT)]).gated(Arc::clone(&gate)));
        wf.select_file(png()).unwrap();

        {
            let mut pending = std::pin::pin!(wf.submit());
            let still_pending =
                std::future::poll_fn(|cx| Poll::Ready(pending.as_mut().poll(cx).is_pending()))
                    .await;
            assert!(still_pending);
            assert_eq!(wf.status(), Status::Submitting);
            wf.select_file(png()).unwrap();
        }

        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Validated);
        assert!(snap.last_error.is_none());
    }

    #[tokio::test]
    async fn resubmit_after_failure_succeeds() {
        let wf = workflow(MockService::returning([
            Err(ApiError::Status {
                status: 503,
                message: "busy".into(),
            }),
            ok(CUT),
        ]));
        wf.select_file(png()).unwrap();

        wf.submit().await.unwrap_err();
        assert_eq!(wf.status(), Status::Failed);

        assert_eq!(wf.submit().await, Ok(Status::Succeeded));
        let snap = wf.snapshot();
        assert!(snap.last_error.is_none());
        assert_eq!(snap.attempts, 2);
        assert_eq!(wf.service().calls(), 2);
    }

    #[tokio::test]
    async fn resubmit_after_success_releases_old_result() {
        let wf = workflow(MockService::returning([ok(b"one"), ok(b"two")]));
        wf.select_file(png()).unwrap();
        wf.submit().await.unwrap();
        let first = wf.snapshot().result.unwrap();

        wf.submit().await.unwrap();
        assert!(wf.resolve(first).is_none());
        assert_eq!(result_bytes(&wf).await, b"two");
        // preview + new result
        assert_eq!(wf.handles().live_count(), 2);
    }

    #[tokio::test]
    async fn reset_releases_everything() {
        let wf = workflow(MockService::returning([ok(CUT)]));
        wf.select_file(png()).unwrap();
        wf.submit().await.unwrap();
        let before = wf.snapshot();

        wf.reset();
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Idle);
        assert!(snap.source.is_none() && snap.preview.is_none() && snap.result.is_none());
        assert!(wf.resolve(before.preview.unwrap()).is_none());
        assert!(wf.resolve(before.result.unwrap()).is_none());
        assert_eq!(wf.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let wf = workflow(MockService::returning([Err(ApiError::InvalidImage {
            message: "bad".into(),
        })]));
        wf.select_file(png()).unwrap();
        let _ = wf.submit().await;

        wf.reset();
        let once = wf.snapshot();
        wf.reset();
        assert_eq!(wf.snapshot(), once);
    }

    #[tokio::test]
    async fn reset_during_submit_drops_outcome() {
        let gate = Arc::new(Notify::new());
        let wf = workflow(MockService::returning([ok(CUT)]).gated(Arc::clone(&gate)));
        wf.select_file(png()).unwrap();

        let (outcome, ()) = tokio::join!(wf.submit(), async {
            tokio::task::yield_now().await;
            assert_eq!(wf.status(), Status::Submitting);
            wf.reset();
            gate.notify_one();
        });

        assert_eq!(outcome, Err(WorkflowError::Superseded));
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Idle);
        assert!(snap.result.is_none() && snap.last_error.is_none());
        assert_eq!(wf.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn new_selection_during_submit_supersedes_it() {
        let gate = Arc::new(Notify::new());
        let wf = workflow(MockService::returning([ok(CUT)]).gated(Arc::clone(&gate)));
        wf.select_file(png()).unwrap();

        let (outcome, ()) = tokio::join!(wf.submit(), async {
            tokio::task::yield_now().await;
            wf.select_file(SourceFile::from_bytes("next.webp", "image/webp", vec![1u8; 8]))
                .unwrap();
            gate.notify_one();
        });

        assert_eq!(outcome, Err(WorkflowError::Superseded));
        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Validated);
        assert_eq!(snap.source.unwrap().name, "next.webp");
        assert!(snap.result.is_none());
        // only the new preview
        assert_eq!(wf.handles().live_count(), 1);
    }

    #[tokio::test]
    async fn rejected_selection_discards_stale_result_only() {
        let wf = workflow(MockService::returning([ok(CUT)]));
        wf.select_file(png()).unwrap();
        wf.submit().await.unwrap();
        let before = wf.snapshot();

        let err = wf
            .select_file(SourceFile::from_bytes("doc.pdf", "application/pdf", vec![0u8; 3]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFileType);

        let snap = wf.snapshot();
        assert_eq!(snap.status, Status::Validated);
        assert_eq!(snap.source, before.source);
        assert_eq!(snap.preview, before.preview);
        assert!(snap.result.is_none());
        assert!(wf.resolve(before.result.unwrap()).is_none());
        assert!(wf.resolve(before.preview.unwrap()).is_some());
    }

    #[test]
    fn selection_cycles_do_not_leak_handles() {
        let wf = workflow(MockService::default());
        for _ in 0..50 {
            wf.select_file(png()).unwrap();
            wf.select_file(png()).unwrap();
            assert_eq!(wf.handles().live_count(), 1);
            wf.reset();
        }
        assert_eq!(wf.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn export_writes_result_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let wf = workflow(MockService::returning([ok(CUT)]));

        let err = wf.export_result(dir.path()).await.unwrap_err();
        assert!(matches!(err, CutoutError::NoResult));

        wf.select_file(png()).unwrap();
        wf.submit().await.unwrap();
        let before = wf.snapshot();

        let out = dir.path().join("cut.png");
        let written = wf.export_result(&out).await.unwrap();
        assert_eq!(written, out);
        assert_eq!(std::fs::read(&out).unwrap(), CUT);
        assert_eq!(wf.snapshot(), before);
    }
}
