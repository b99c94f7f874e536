use async_trait::async_trait;
use summarist_common::Result;

/// Transcribes recorded speech
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// `filename` carries the container format to the backend
    async fn transcribe(&self, audio: &[u8], filename: &str) -> Result<String>;
}

/// Narrates text as encoded audio
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str, instructions: &str) -> Result<Vec<u8>>;
}
