pub mod api;
pub mod auth;
pub mod config;
pub mod credits;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use api::{
    ApiError, ConversionMode, CurrentUser, HttpJobApi, Job, JobApi, JobStatus, SubmissionOptions,
    VoiceProvider,
};
pub use auth::{EnvTokenSource, TokenError, TokenSource};
pub use config::ClientConfig;
pub use credits::{CreditState, CreditStore};
pub use upload::{
    ErrorKind, SelectedFile, SelectionError, UploadPhase, UploadSession, UploadSnapshot,
};

use std::sync::Arc;

/// Wires the capability seams into a ready-to-use client core: one shared
/// HTTP boundary, one upload session, one credit store.
pub struct ClientCore {
    pub session: UploadSession,
    pub credits: CreditStore,
}

impl ClientCore {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let api: Arc<dyn JobApi> = Arc::new(HttpJobApi::new(config)?);

        Ok(Self {
            session: UploadSession::new(Arc::clone(&tokens), Arc::clone(&api)),
            credits: CreditStore::new(tokens, api),
        })
    }

    pub fn from_env(tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        Self::new(&ClientConfig::from_env(), tokens)
    }
}
