//! Scripted capability implementations for deterministic scenario tests.

use crate::api::{ApiError, CurrentUser, Job, JobApi, JobStatus, SubmissionOptions};
use crate::auth::{TokenError, TokenSource};
use crate::upload::SelectedFile;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

pub fn job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        status,
        original_filename: None,
        progress_percentage: None,
        error_message: None,
        created_at: None,
    }
}

/// Runs every spawned task that is currently ready, without moving the clock.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advances paused time in small steps so interleaved timers fire in order.
pub async fn advance_and_settle(duration: Duration) {
    let step = Duration::from_millis(50);
    let mut remaining = duration;
    while remaining > Duration::ZERO {
        let chunk = remaining.min(step);
        tokio::time::advance(chunk).await;
        settle().await;
        remaining -= chunk;
    }
}

pub struct ScriptedTokenSource {
    response: Result<Option<String>, TokenError>,
    calls: AtomicUsize,
}

impl ScriptedTokenSource {
    pub fn with_token(token: &str) -> Self {
        Self {
            response: Ok(Some(token.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            response: Ok(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(TokenError::Provider(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for ScriptedTokenSource {
    async fn get_token(&self) -> Result<Option<String>, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

pub struct ScriptedJobApi {
    create_result: Result<Job, ApiError>,
    create_delay: Duration,
    create_calls: AtomicUsize,
    user_script: Mutex<VecDeque<(Duration, Result<i64, ApiError>)>>,
    user_calls: AtomicUsize,
}

impl Default for ScriptedJobApi {
    fn default() -> Self {
        Self {
            create_result: Ok(job("job_default", JobStatus::Queued)),
            create_delay: Duration::ZERO,
            create_calls: AtomicUsize::new(0),
            user_script: Mutex::new(VecDeque::new()),
            user_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedJobApi {
    pub fn succeeding(job: Job) -> Self {
        Self {
            create_result: Ok(job),
            ..Self::default()
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            create_result: Err(error),
            ..Self::default()
        }
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Queue the next `get_current_user` outcome; entries resolve in call
    /// order, each after its own delay.
    pub fn queue_user(&self, delay: Duration, result: Result<i64, ApiError>) {
        self.user_script
            .lock()
            .unwrap()
            .push_back((delay, result));
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobApi for ScriptedJobApi {
    async fn create_job(
        &self,
        _file: &SelectedFile,
        _bytes: Vec<u8>,
        _options: &SubmissionOptions,
        _token: &str,
    ) -> Result<Job, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.create_delay).await;
        self.create_result.clone()
    }

    async fn get_current_user(&self, _token: &str) -> Result<CurrentUser, ApiError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.user_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                sleep(delay).await;
                result.map(|credit_balance| CurrentUser {
                    credit_balance,
                    email: None,
                })
            }
            None => Ok(CurrentUser {
                credit_balance: 0,
                email: None,
            }),
        }
    }
}
