use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport-level settings for talking to the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build from environment variables, loading a local `.env` first.
    ///
    /// `AUDIOBOOK_API_URL` sets the backend base URL and
    /// `AUDIOBOOK_HTTP_TIMEOUT_SECS` bounds every request.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let api_base_url = std::env::var("AUDIOBOOK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = std::env::var("AUDIOBOOK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            api_base_url,
            request_timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
