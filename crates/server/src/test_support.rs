//! Mock providers and app builders for route tests

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use summarist_audio::{AudioService, SpeechToText, TextToSpeech};
use summarist_common::{AppConfig, Result, SummaristError};
use summarist_llm::{CacheStore, FragmentStream, LlmClient, MemoryKv, PromptBuilder, SummarizerService};
use summarist_parser::FileParser;

use crate::state::AppState;

pub const TRANSCRIPT: &str = "Welcome to the weekly standup. Today we will review the release \
    schedule and assign owners for the remaining tasks.";

pub const SPEECH: &[u8] = b"ID3-fake-mp3";

pub struct MockLlm {
    response: std::result::Result<String, String>,
    fragments: Vec<std::result::Result<String, String>>,
    pub calls: AtomicUsize,
}

impl MockLlm {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            fragments: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            fragments: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn streaming(fragments: Vec<std::result::Result<&str, &str>>) -> Self {
        Self {
            response: Ok(String::new()),
            fragments: fragments
                .into_iter()
                .map(|f| f.map(str::to_string).map_err(str::to_string))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, _system: &str, _user: &str, _max_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(SummaristError::provider)
    }

    async fn stream(&self, _system: &str, _user: &str, _max_tokens: u32) -> Result<FragmentStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<String>> = self
            .fragments
            .iter()
            .cloned()
            .map(|f| f.map_err(SummaristError::provider))
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

pub struct MockAudio;

#[async_trait]
impl SpeechToText for MockAudio {
    async fn transcribe(&self, _audio: &[u8], _filename: &str) -> Result<String> {
        Ok(TRANSCRIPT.to_string())
    }
}

#[async_trait]
impl TextToSpeech for MockAudio {
    async fn synthesize(&self, _text: &str, _instructions: &str) -> Result<Vec<u8>> {
        Ok(SPEECH.to_vec())
    }
}

pub fn test_state(llm: MockLlm) -> AppState {
    test_state_with(Arc::new(llm))
}

pub fn test_state_with(llm: Arc<MockLlm>) -> AppState {
    let prompts = PromptBuilder::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../prompts"));
    let cache = CacheStore::new(Arc::new(MemoryKv::new()), Duration::from_secs(60));
    let summarizer = SummarizerService::new(llm, cache, prompts, 256);
    let audio = AudioService::new(Arc::new(MockAudio), Arc::new(MockAudio));

    AppState::new(AppConfig::default(), summarizer, FileParser::new(), audio)
}

pub fn test_app(
    llm: MockLlm,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    app_for(test_state(llm))
}

pub fn app_for(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(Arc::new(state)))
        .configure(crate::configure)
}

/// Hand-built `multipart/form-data` body with a single `file` field
pub fn multipart_body(filename: &str, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = "----summarist-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}
