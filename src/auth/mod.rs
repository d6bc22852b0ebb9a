// src/auth/mod.rs
// Credential issuer seam

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    #[error("Token provider failure: {0}")]
    Provider(String),
}

/// Yields the bearer credential for the signed-in user.
///
/// `Ok(None)` means there is no authenticated session. Callers must treat
/// that as a permission condition, not a network failure. Tokens rotate, so
/// a fresh one is requested per network call and never persisted.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn get_token(&self) -> Result<Option<String>, TokenError>;
}

/// Reads a static bearer token from the environment. Intended for local
/// development and scripted use against a test backend.
pub struct EnvTokenSource {
    var: String,
}

impl EnvTokenSource {
    pub fn new() -> Self {
        Self {
            var: "AUDIOBOOK_API_TOKEN".to_string(),
        }
    }

    pub fn with_var(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for EnvTokenSource {
    async fn get_token(&self) -> Result<Option<String>, TokenError> {
        let token = std::env::var(&self.var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(token)
    }
}
