use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use summarist_common::{Result, SummaristError};
use tracing::{debug, info};

use crate::llm_trait::{FragmentStream, LlmClient};
use crate::streaming::{fragment_stream, LineEvent};

/// Ollama chat request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Generation options
#[derive(Debug, Clone, Serialize)]
struct ChatOptions {
    /// Maximum tokens to generate
    num_predict: u32,
}

/// Ollama chat response (one NDJSON line when streaming)
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,

    /// Whether generation is complete
    #[serde(default)]
    done: bool,

    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minutes for LLM calls
            .build()
            .map_err(|e| SummaristError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {} ({})", base_url, model);
        Ok(Self {
            base_url,
            model,
            client,
        })
    }

    fn chat_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        max_tokens: u32,
        stream: bool,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream,
            options: ChatOptions {
                num_predict: max_tokens,
            },
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SummaristError::provider(format!("Failed to reach Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaristError::provider(format!(
                "Ollama API error: HTTP {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// Map one NDJSON line of a streamed chat to a fragment event
fn parse_chat_line(line: &str) -> LineEvent {
    let chunk: ChatResponse = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => return LineEvent::Failed(format!("Malformed Ollama stream line: {}", e)),
    };

    if let Some(error) = chunk.error {
        return LineEvent::Failed(format!("Ollama API error: {}", error));
    }

    let content = chunk.message.map(|m| m.content).unwrap_or_default();
    match (chunk.done, content.is_empty()) {
        (true, true) => LineEvent::Finished,
        (true, false) => LineEvent::FinalFragment(content),
        (false, true) => LineEvent::Skip,
        (false, false) => LineEvent::Fragment(content),
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
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
            "Sending chat request to Ollama - Model: {}, Prompt length: {}",
            self.model,
            user_prompt.len()
        );

        let request = self.chat_request(system_prompt, user_prompt, max_tokens, false);
        let response = self.send(&request).await?;

        let result: ChatResponse = response.json().await.map_err(|e| {
            SummaristError::provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        if let Some(error) = result.error {
            return Err(SummaristError::provider(format!("Ollama API error: {}", error)));
        }

        let content = result.message.map(|m| m.content).unwrap_or_default();
        if content.is_empty() {
            return Err(SummaristError::provider("Empty response from Ollama"));
        }

        debug!("Received response from Ollama - Length: {}", content.len());
        Ok(content)
    }

    async fn stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<FragmentStream> {
        let request = self.chat_request(system_prompt, user_prompt, max_tokens, true);
        let response = self.send(&request).await?;

        Ok(fragment_stream(response.bytes_stream(), parse_chat_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2").unwrap();
        assert_eq!(client.model(), "llama3.2");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_shape() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2").unwrap();
        let request = client.chat_request("sys", "user", 256, true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user");
        assert_eq!(json["options"]["num_predict"], 256);
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_parse_chat_line() {
        assert_eq!(
            parse_chat_line(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#),
            LineEvent::Fragment("Hi".to_string())
        );
        assert_eq!(
            parse_chat_line(r#"{"message":{"role":"assistant","content":""},"done":true}"#),
            LineEvent::Finished
        );
        assert_eq!(
            parse_chat_line(r#"{"message":{"role":"assistant","content":"!"},"done":true}"#),
            LineEvent::FinalFragment("!".to_string())
        );
        assert!(matches!(
            parse_chat_line(r#"{"error":"model not found"}"#),
            LineEvent::Failed(msg) if msg.contains("model not found")
        ));
        assert!(matches!(parse_chat_line("not json"), LineEvent::Failed(_)));
    }
}
