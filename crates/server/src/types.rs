use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use summarist_llm::{Style, SummaryResult};

/// `POST /summarize` body
#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub text: String,

    #[serde(default)]
    pub max_length: Option<u32>,

    /// Parsed into [`Style`] by the handler so unknown names map to 422
    #[serde(default)]
    pub style: Option<String>,
}

/// `?tts=` switch for JSON summaries
#[derive(Debug, Default, Deserialize)]
pub struct TtsQuery {
    #[serde(default)]
    pub tts: bool,
}

/// Query parameters of `POST /upload`
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    #[serde(default)]
    pub style: Option<String>,

    #[serde(default)]
    pub max_length: Option<u32>,
}

/// Query parameters of `POST /transcribe`
#[derive(Debug, Default, Deserialize)]
pub struct TranscribeQuery {
    #[serde(default)]
    pub style: Option<String>,

    #[serde(default)]
    pub max_length: Option<u32>,

    #[serde(default)]
    pub tts: bool,
}

/// Summary as returned to HTTP clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub style: Style,
    pub model: String,

    /// Words in the submitted text
    pub prompt_length: usize,

    /// Words in the summary
    pub summary_length: usize,

    pub summary_ts: DateTime<Utc>,

    /// Narrated summary, base64 encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl From<SummaryResult> for SummaryResponse {
    fn from(result: SummaryResult) -> Self {
        Self {
            audio_base64: result.audio.as_deref().map(|audio| STANDARD.encode(audio)),
            summary: result.summary,
            style: result.style,
            model: result.model,
            prompt_length: result.prompt_word_count,
            summary_length: result.summary_word_count,
            summary_ts: result.generated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub app: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
