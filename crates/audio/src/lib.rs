//! Speech-to-text and text-to-speech for the summarization service

pub mod openai;
pub mod provider;
pub mod service;

use std::path::Path;
use summarist_common::{Result, SummaristError};

pub use openai::OpenAiAudioClient;
pub use provider::{SpeechToText, TextToSpeech};
pub use service::{build_audio_service, AudioService};

/// Largest audio upload the transcription backend accepts (25 MiB)
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

pub const SUPPORTED_AUDIO_FORMATS: &[&str] =
    &[".mp3", ".mp4", ".mpeg", ".mpga", ".m4a", ".wav", ".webm"];

/// Reject audio uploads the transcription backend would refuse
pub fn validate_audio_upload(audio: &[u8], filename: &str) -> Result<()> {
    if audio.len() > MAX_AUDIO_BYTES {
        return Err(SummaristError::payload_too_large("File too large (max 25 MB)"));
    }

    let extension = Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    if !SUPPORTED_AUDIO_FORMATS.contains(&extension.as_str()) {
        return Err(SummaristError::user_input(format!(
            "Unsupported audio format '{}'. Supported: {}",
            extension,
            SUPPORTED_AUDIO_FORMATS.join(", ")
        )));
    }

    if audio.is_empty() {
        return Err(SummaristError::user_input(format!(
            "{} is empty - nothing to transcribe.",
            filename
        )));
    }

    Ok(())
}
