use std::sync::Arc;
use summarist_common::{AppConfig, Result, SummaristError};
use tracing::info;

use crate::openai::OpenAiAudioClient;
use crate::provider::{SpeechToText, TextToSpeech};

/// Delivery instructions sent with every narration
pub const TTS_INSTRUCTIONS: &str = "Speak in a cheerful and positive tone.";

/// Transcription and narration over pluggable providers
#[derive(Clone)]
pub struct AudioService {
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
}

impl AudioService {
    pub fn new(stt: Arc<dyn SpeechToText>, tts: Arc<dyn TextToSpeech>) -> Self {
        Self { stt, tts }
    }

    /// Transcribe an audio upload to text
    pub async fn transcribe(&self, audio: &[u8], filename: &str) -> Result<String> {
        let text = self.stt.transcribe(audio, filename).await?;
        info!("Transcribed {} - {} chars", filename, text.len());
        Ok(text)
    }

    /// Narrate `text`, returning encoded audio
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let audio = self.tts.synthesize(text, TTS_INSTRUCTIONS).await?;
        info!("Synthesized speech - {} bytes", audio.len());
        Ok(audio)
    }
}

/// Build the configured audio service
pub fn build_audio_service(config: &AppConfig) -> Result<AudioService> {
    match config.audio_provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| SummaristError::config("OPENAI_API_KEY is not set"))?;
            let client = Arc::new(OpenAiAudioClient::new(
                api_key,
                &config.openai_base_url,
                &config.whisper_model,
                &config.tts_model,
                &config.tts_voice,
            )?);
            Ok(AudioService::new(client.clone(), client))
        }
        other => Err(SummaristError::config(format!(
            "Unsupported audio provider: '{}'. Supported: openai",
            other
        ))),
    }
}
