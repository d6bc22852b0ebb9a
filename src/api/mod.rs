// src/api/mod.rs
// Job API boundary

mod http;
mod types;

pub use http::HttpJobApi;
pub use types::{ConversionMode, CurrentUser, Job, JobStatus, SubmissionOptions, VoiceProvider};

use crate::upload::SelectedFile;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Authentication missing or rejected")]
    Unauthorized,

    #[error("The server rejected the upload: {0}")]
    PayloadRejected(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Unexpected API failure: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Whether a manual retry of the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ServiceUnavailable(_))
    }
}

/// Typed boundary over the two backend calls this core needs. Stateless
/// beyond the underlying HTTP client; retry policy belongs to the caller.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit a document for conversion as a single multipart request.
    async fn create_job(
        &self,
        file: &SelectedFile,
        bytes: Vec<u8>,
        options: &SubmissionOptions,
        token: &str,
    ) -> Result<Job, ApiError>;

    /// Fetch the signed-in user's profile, including the credit balance.
    async fn get_current_user(&self, token: &str) -> Result<CurrentUser, ApiError>;
}
