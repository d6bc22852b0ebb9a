// src/api/types.rs
// Wire types shared with the backend job API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-owned job status. The backend may grow new states, so unknown
/// strings deserialize to `Unknown` instead of failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Read-only snapshot of a conversion job, as returned at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub progress_percentage: Option<u8>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub credit_balance: i64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProvider {
    Openai,
    Google,
    AwsPolly,
    Azure,
    ElevenLabs,
}

impl VoiceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceProvider::Openai => "openai",
            VoiceProvider::Google => "google",
            VoiceProvider::AwsPolly => "aws_polly",
            VoiceProvider::Azure => "azure",
            VoiceProvider::ElevenLabs => "eleven_labs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    Full,
    SummaryExplanation,
}

impl ConversionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Full => "full",
            ConversionMode::SummaryExplanation => "summary_explanation",
        }
    }
}

/// Conversion parameters sent with every job. Fixed defaults for now; the
/// backend accepts the full range.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOptions {
    pub voice_provider: VoiceProvider,
    pub voice_type: String,
    pub reading_speed: f32,
    pub include_summary: bool,
    pub conversion_mode: ConversionMode,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            voice_provider: VoiceProvider::Openai,
            voice_type: "alloy".to_string(),
            reading_speed: 1.0,
            include_summary: true,
            conversion_mode: ConversionMode::Full,
        }
    }
}
