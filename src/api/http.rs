// src/api/http.rs
// Reqwest-backed JobApi implementation

use super::types::{CurrentUser, Job, SubmissionOptions};
use super::{ApiError, JobApi};
use crate::config::ClientConfig;
use crate::upload::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::StatusCode;
use serde::Deserialize;

const JOBS_PATH: &str = "/api/v1/jobs";
const CURRENT_USER_PATH: &str = "/api/v1/users/me";

pub struct HttpJobApi {
    client: reqwest::Client,
    base_url: String,
}

/// Failure envelope the backend wraps errors in.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpJobApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Unknown(format!("HTTP client init: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify(status: StatusCode, body: String) -> ApiError {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);

        match status.as_u16() {
            401 | 403 => ApiError::Unauthorized,
            400 | 413 | 415 | 422 => ApiError::PayloadRejected(message),
            408 | 429 => ApiError::ServiceUnavailable(message),
            s if s >= 500 => ApiError::ServiceUnavailable(message),
            _ => ApiError::Unknown(format!("HTTP {}: {}", status, message)),
        }
    }

    fn transport_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() || e.is_connect() {
            ApiError::ServiceUnavailable(e.to_string())
        } else {
            ApiError::Unknown(e.to_string())
        }
    }
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn create_job(
        &self,
        file: &SelectedFile,
        bytes: Vec<u8>,
        options: &SubmissionOptions,
        token: &str,
    ) -> Result<Job, ApiError> {
        let file_part = multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Unknown(e.to_string()))?;

        let form = multipart::Form::new()
            .text("voice_provider", options.voice_provider.as_str())
            .text("voice_type", options.voice_type.clone())
            .text("reading_speed", options.reading_speed.to_string())
            .text("include_summary", options.include_summary.to_string())
            .text("conversion_mode", options.conversion_mode.as_str())
            .part("file", file_part);

        tracing::info!("Creating job for '{}' ({} bytes)", file.name, file.byte_size);

        let response = self
            .client
            .post(self.url(JOBS_PATH))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Job creation rejected: HTTP {}", status);
            return Err(Self::classify(status, body));
        }

        response
            .json::<Job>()
            .await
            .map_err(|e| ApiError::Unknown(format!("Job parse: {}", e)))
    }

    async fn get_current_user(&self, token: &str) -> Result<CurrentUser, ApiError> {
        let response = self
            .client
            .get(self.url(CURRENT_USER_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify(status, body));
        }

        response
            .json::<CurrentUser>()
            .await
            .map_err(|e| ApiError::Unknown(format!("User parse: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_auth_statuses() {
        assert_eq!(
            HttpJobApi::classify(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Unauthorized
        );
        assert_eq!(
            HttpJobApi::classify(StatusCode::FORBIDDEN, String::new()),
            ApiError::Unauthorized
        );
    }

    #[test]
    fn classify_validation_statuses_keep_server_message() {
        let body = r#"{"error":{"type":"application_error","message":"PDF has no extractable text","status_code":422}}"#;
        let err = HttpJobApi::classify(StatusCode::UNPROCESSABLE_ENTITY, body.to_string());
        assert_eq!(
            err,
            ApiError::PayloadRejected("PDF has no extractable text".to_string())
        );
    }

    #[test]
    fn classify_falls_back_to_raw_body() {
        let err = HttpJobApi::classify(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string());
        assert_eq!(err, ApiError::PayloadRejected("too big".to_string()));
    }

    #[test]
    fn classify_server_failures_are_retryable() {
        let err = HttpJobApi::classify(StatusCode::BAD_GATEWAY, String::new());
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
        assert!(err.is_retryable());

        let err = HttpJobApi::classify(StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(err.is_retryable());
    }

    #[test]
    fn classify_unexpected_status() {
        let err = HttpJobApi::classify(StatusCode::IM_A_TEAPOT, String::new());
        assert!(matches!(err, ApiError::Unknown(_)));
        assert!(!err.is_retryable());
    }
}
