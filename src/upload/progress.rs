use super::file::SelectedFile;
use super::ErrorKind;
use crate::api::Job;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Submitting,
    Succeeded,
    Failed,
}

/// Point-in-time view of the current attempt, safe to render as-is.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSnapshot {
    pub phase: UploadPhase,
    pub progress: u8,
    pub file: Option<SelectedFile>,
    pub job: Option<Job>,
    pub error: Option<ErrorKind>,
}
