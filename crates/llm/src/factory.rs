//! LLM Factory - Provider Abstraction Layer
//!
//! Picks the concrete [`LlmClient`] from configuration. Unknown providers
//! fail here, at startup, never on first use.

use std::str::FromStr;
use std::sync::Arc;
use summarist_common::{AppConfig, Result, SummaristError};

use crate::anthropic::AnthropicClient;
use crate::client::OllamaClient;
use crate::llm_trait::LlmClient;

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API
    Anthropic,
    /// Local models through Ollama
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = SummaristError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(SummaristError::config(format!(
                "Unsupported LLM provider: '{}'. Supported: anthropic, ollama",
                other
            ))),
        }
    }
}

/// Build the configured LLM client
pub fn build_llm_client(config: &AppConfig) -> Result<Arc<dyn LlmClient>> {
    let provider: LlmProvider = config.llm_provider.parse()?;

    let client: Arc<dyn LlmClient> = match provider {
        LlmProvider::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| SummaristError::config("ANTHROPIC_API_KEY is not set"))?;
            Arc::new(AnthropicClient::new(
                api_key,
                &config.anthropic_base_url,
                &config.llm_model,
            )?)
        }
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            &config.ollama_base_url,
            &config.llm_model,
        )?),
    };

    Ok(client)
}
