use crate::api::{ApiError, Job, JobApi, SubmissionOptions};
use crate::auth::TokenSource;
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

pub mod file;
pub mod progress;

pub use file::{SelectedFile, SelectionError, MAX_FILE_BYTES, PDF_MIME};
pub use progress::{UploadPhase, UploadSnapshot};

const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CEILING: u8 = 90;
const RESET_DELAY: Duration = Duration::from_secs(3);

/// Attempt failure surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("You must be signed in to upload a file.")]
    Unauthorized,

    #[error("{0}")]
    PayloadRejected(String),

    #[error("Upload failed. Please try again.")]
    ServiceUnavailable,

    #[error("Upload failed. Please try again.")]
    Unknown,
}

impl From<ApiError> for ErrorKind {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::PayloadRejected(message) => ErrorKind::PayloadRejected(message),
            ApiError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            ApiError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

struct SessionInner {
    phase: UploadPhase,
    attempt_id: Uuid,
    progress: u8,
    file: Option<SelectedFile>,
    bytes: Vec<u8>,
    job: Option<Job>,
    error: Option<ErrorKind>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            attempt_id: Uuid::new_v4(),
            progress: 0,
            file: None,
            bytes: Vec::new(),
            job: None,
            error: None,
        }
    }

    /// Back to `Idle`. A fresh attempt id invalidates any task still holding
    /// the old one.
    fn clear_attempt(&mut self) {
        self.phase = UploadPhase::Idle;
        self.attempt_id = Uuid::new_v4();
        self.progress = 0;
        self.file = None;
        self.bytes = Vec::new();
        self.job = None;
        self.error = None;
    }
}

#[derive(Default)]
struct TaskSet {
    ticker: Option<JoinHandle<()>>,
    submit: Option<JoinHandle<()>>,
    reset: Option<JoinHandle<()>>,
}

impl TaskSet {
    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn cancel_reset(&mut self) {
        if let Some(handle) = self.reset.take() {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        self.cancel_ticker();
        self.cancel_reset();
        if let Some(handle) = self.submit.take() {
            handle.abort();
        }
    }
}

/// Owns the lifecycle of a single file-to-job submission attempt.
///
/// All mutation goes through `select_file`, `start` and `remove`; background
/// tasks (progress ticker, submission, auto-reset) write back only while the
/// attempt they were spawned for is still the current one.
pub struct UploadSession {
    tokens: Arc<dyn TokenSource>,
    api: Arc<dyn JobApi>,
    options: SubmissionOptions,
    inner: Arc<TokioMutex<SessionInner>>,
    tasks: Arc<StdMutex<TaskSet>>,
}

impl UploadSession {
    pub fn new(tokens: Arc<dyn TokenSource>, api: Arc<dyn JobApi>) -> Self {
        Self::with_options(tokens, api, SubmissionOptions::default())
    }

    pub fn with_options(
        tokens: Arc<dyn TokenSource>,
        api: Arc<dyn JobApi>,
        options: SubmissionOptions,
    ) -> Self {
        Self {
            tokens,
            api,
            options,
            inner: Arc::new(TokioMutex::new(SessionInner::new())),
            tasks: Arc::new(StdMutex::new(TaskSet::default())),
        }
    }

    /// Validate and stage a document. A second selection replaces the current
    /// one; it never queues. Rejected while an attempt is in flight.
    pub async fn select_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SelectionError> {
        let file = SelectedFile::validate(name, mime_type, bytes.len() as u64)?;

        let mut inner = self.inner.lock().await;
        if inner.phase == UploadPhase::Submitting {
            return Err(SelectionError::Busy);
        }

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.cancel_reset();
        }

        inner.clear_attempt();
        tracing::info!("File selected: '{}' ({:.2} MB)", file.name, file.size_mb());
        inner.file = Some(file);
        inner.bytes = bytes;
        inner.phase = UploadPhase::FileSelected;
        Ok(())
    }

    /// Begin the submission. No-op unless a file is staged, so a double
    /// trigger cannot produce a second network call for the same attempt.
    pub async fn start(&self) {
        let (attempt_id, file, bytes) = {
            let mut inner = self.inner.lock().await;
            if inner.phase != UploadPhase::FileSelected {
                tracing::warn!("start ignored in phase {:?}", inner.phase);
                return;
            }
            let Some(file) = inner.file.clone() else {
                return;
            };

            let attempt_id = Uuid::new_v4();
            inner.attempt_id = attempt_id;
            inner.phase = UploadPhase::Submitting;
            inner.progress = 0;
            inner.job = None;
            inner.error = None;
            (attempt_id, file, std::mem::take(&mut inner.bytes))
        };

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.abort_all();
        }

        let ticker = tokio::spawn(Self::progress_ticker(Arc::clone(&self.inner), attempt_id));

        let tokens = Arc::clone(&self.tokens);
        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);
        let tasks = Arc::clone(&self.tasks);
        let options = self.options.clone();
        let submit = tokio::spawn(async move {
            let outcome: Result<Job, ErrorKind> = async {
                let token = tokens
                    .get_token()
                    .await
                    .map_err(|e| {
                        tracing::warn!("Token fetch failed: {}", e);
                        ErrorKind::ServiceUnavailable
                    })?
                    .ok_or(ErrorKind::Unauthorized)?;

                api.create_job(&file, bytes, &options, &token)
                    .await
                    .map_err(ErrorKind::from)
            }
            .await;

            let mut state = inner.lock().await;
            if state.attempt_id != attempt_id || state.phase != UploadPhase::Submitting {
                tracing::debug!("Discarding result of superseded attempt {}", attempt_id);
                return;
            }

            // The response always wins over the ticker.
            if let Ok(mut t) = tasks.lock() {
                t.cancel_ticker();
            }

            match outcome {
                Ok(job) => {
                    tracing::info!("Job created: id={}, status={:?}", job.id, job.status);
                    state.progress = 100;
                    state.job = Some(job);
                    state.phase = UploadPhase::Succeeded;

                    let reset_inner = Arc::clone(&inner);
                    let reset = tokio::spawn(async move {
                        sleep(RESET_DELAY).await;
                        let mut state = reset_inner.lock().await;
                        if state.attempt_id == attempt_id
                            && state.phase == UploadPhase::Succeeded
                        {
                            state.clear_attempt();
                        }
                    });
                    if let Ok(mut t) = tasks.lock() {
                        t.cancel_reset();
                        t.reset = Some(reset);
                    }
                }
                Err(kind) => {
                    tracing::warn!("Upload failed: {}", kind);
                    state.progress = 0;
                    state.error = Some(kind);
                    state.phase = UploadPhase::Failed;
                }
            }
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.ticker = Some(ticker);
            tasks.submit = Some(submit);
        }
    }

    /// Discard the current attempt. No-op while a submission is in flight;
    /// an attempt cannot be cancelled client-side once sent.
    pub async fn remove(&self) {
        let mut inner = self.inner.lock().await;
        match inner.phase {
            UploadPhase::Submitting => {
                tracing::warn!("remove ignored: attempt in flight");
            }
            UploadPhase::Idle => {}
            _ => {
                if let Ok(mut tasks) = self.tasks.lock() {
                    tasks.abort_all();
                }
                inner.clear_attempt();
            }
        }
    }

    pub async fn snapshot(&self) -> UploadSnapshot {
        let inner = self.inner.lock().await;
        UploadSnapshot {
            phase: inner.phase,
            progress: inner.progress,
            file: inner.file.clone(),
            job: inner.job.clone(),
            error: inner.error.clone(),
        }
    }

    /// Cosmetic progress. Advances on a fixed cadence and parks below 100;
    /// only the backend response moves the bar to its terminal value.
    async fn progress_ticker(inner: Arc<TokioMutex<SessionInner>>, attempt_id: Uuid) {
        loop {
            sleep(PROGRESS_TICK).await;
            let mut state = inner.lock().await;
            if state.attempt_id != attempt_id || state.phase != UploadPhase::Submitting {
                break;
            }
            state.progress = (state.progress + PROGRESS_STEP).min(PROGRESS_CEILING);
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.abort_all();
        }
    }
}
