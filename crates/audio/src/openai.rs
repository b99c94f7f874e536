//! OpenAI audio API backend (Whisper transcription and TTS)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use summarist_common::{Result, SummaristError};
use tracing::{debug, info};

use crate::provider::{SpeechToText, TextToSpeech};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    instructions: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for `/v1/audio/transcriptions` and `/v1/audio/speech`
#[derive(Debug, Clone)]
pub struct OpenAiAudioClient {
    api_key: String,
    base_url: String,
    whisper_model: String,
    tts_model: String,
    tts_voice: String,
    client: Client,
}

impl OpenAiAudioClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        whisper_model: impl Into<String>,
        tts_model: impl Into<String>,
        tts_voice: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummaristError::config("OPENAI_API_KEY is not set"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| SummaristError::config(format!("Failed to create HTTP client: {}", e)))?;

        let audio = Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            whisper_model: whisper_model.into(),
            tts_model: tts_model.into(),
            tts_voice: tts_voice.into(),
            client,
        };
        info!(
            "OpenAI audio client initialized: {} (stt: {}, tts: {}/{})",
            audio.base_url, audio.whisper_model, audio.tts_model, audio.tts_voice
        );
        Ok(audio)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/audio/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into the matching error
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

/// 400 means the audio or text itself was rejected; anything else is the backend's fault
fn status_error(status: StatusCode, body: &str) -> SummaristError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::BAD_REQUEST {
        SummaristError::user_input(message)
    } else {
        SummaristError::provider(format!("OpenAI audio API error: HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl SpeechToText for OpenAiAudioClient {
    async fn transcribe(&self, audio: &[u8], filename: &str) -> Result<String> {
        debug!("Transcribing {} ({} bytes)", filename, audio.len());

        let form = Form::new()
            .text("model", self.whisper_model.clone())
            .part("file", Part::bytes(audio.to_vec()).file_name(filename.to_string()));

        let response = self
            .client
            .post(self.url("transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SummaristError::provider(format!("Failed to reach OpenAI: {}", e)))?;

        let body: TranscriptionResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                SummaristError::provider(format!("Failed to parse transcription response: {}", e))
            })?;

        Ok(body.text)
    }
}

#[async_trait]
impl TextToSpeech for OpenAiAudioClient {
    async fn synthesize(&self, text: &str, instructions: &str) -> Result<Vec<u8>> {
        debug!("Synthesizing speech - {} chars", text.len());

        let request = SpeechRequest {
            model: &self.tts_model,
            voice: &self.tts_voice,
            input: text,
            instructions,
        };

        let response = self
            .client
            .post(self.url("speech"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaristError::provider(format!("Failed to reach OpenAI: {}", e)))?;

        let audio = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| SummaristError::provider(format!("Failed to read speech audio: {}", e)))?;

        Ok(audio.to_vec())
    }
}
