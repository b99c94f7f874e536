//! Anthropic Messages API backend
//!
//! Buffered completions via `POST /v1/messages`, streaming via the same
//! endpoint with `stream: true` (server-sent events).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use summarist_common::{Result, SummaristError};
use tracing::{debug, info};

use crate::llm_trait::{FragmentStream, LlmClient};
use crate::streaming::{fragment_stream, sse_data, LineEvent};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Anthropic Claude client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummaristError::config("ANTHROPIC_API_KEY is not set"));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| SummaristError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Anthropic client initialized: {} ({})", base_url, model);
        Ok(Self {
            api_key,
            base_url,
            model,
            client,
        })
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| SummaristError::provider(format!("Failed to reach Anthropic: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaristError::provider(format!(
                "Anthropic API error: HTTP {}: {}",
                status,
                error_message(&body).unwrap_or(body)
            )));
        }

        Ok(response)
    }

    fn request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        max_tokens: u32,
        stream: bool,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens,
            system: system_prompt,
            messages: [Message {
                role: "user",
                content: user_prompt,
            }],
            stream,
        }
    }
}

/// Pull `error.message` out of an Anthropic error body
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Map one SSE line of a streamed message to a fragment event
fn parse_event_line(line: &str) -> LineEvent {
    // `event:` lines repeat the `type` carried in the data payload
    let Some(data) = sse_data(line) else {
        return LineEvent::Skip;
    };

    let json: Value = match serde_json::from_str(data) {
        Ok(json) => json,
        Err(e) => return LineEvent::Failed(format!("Malformed Anthropic event: {}", e)),
    };

    match json.get("type").and_then(Value::as_str).unwrap_or("") {
        "content_block_delta" => {
            let delta = &json["delta"];
            match (delta["type"].as_str(), delta["text"].as_str()) {
                (Some("text_delta"), Some(text)) if !text.is_empty() => {
                    LineEvent::Fragment(text.to_string())
                }
                _ => LineEvent::Skip,
            }
        }
        "message_stop" => LineEvent::Finished,
        "error" => LineEvent::Failed(format!(
            "Anthropic stream error: {}",
            json["error"]["message"].as_str().unwrap_or("unknown error")
        )),
        // message_start, content_block_start/stop, message_delta, ping
        _ => LineEvent::Skip,
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(
            "Sending messages request - Model: {}, Prompt length: {}",
            self.model,
            user_prompt.len()
        );

        let request = self.request(system_prompt, user_prompt, max_tokens, false);
        let response = self.send(&request).await?;

        let body: MessagesResponse = response.json().await.map_err(|e| {
            SummaristError::provider(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let text: String = body
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.is_empty() {
            return Err(SummaristError::provider("Empty response from Anthropic"));
        }

        Ok(text)
    }

    async fn stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<FragmentStream> {
        let request = self.request(system_prompt, user_prompt, max_tokens, true);
        let response = self.send(&request).await?;

        Ok(fragment_stream(response.bytes_stream(), parse_event_line))
    }
}
