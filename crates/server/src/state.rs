use summarist_audio::{build_audio_service, AudioService};
use summarist_common::{AppConfig, Result, SummaristError};
use summarist_llm::{
    build_cache_store, build_llm_client, PromptBuilder, Style, SummarizeRequest,
    SummarizerService, DEFAULT_MAX_LENGTH,
};
use summarist_parser::FileParser;
use tracing::{info, warn};

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    pub summarizer: SummarizerService,

    pub parser: FileParser,

    pub audio: AudioService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        summarizer: SummarizerService,
        parser: FileParser,
        audio: AudioService,
    ) -> Self {
        Self {
            config,
            summarizer,
            parser,
            audio,
        }
    }

    /// Wire every service from configuration; provider misconfiguration fails here
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let llm = build_llm_client(&config)?;
        let cache = build_cache_store(&config)?;
        let prompts = PromptBuilder::new(&config.prompts_dir);
        let summarizer = SummarizerService::new(llm, cache, prompts, config.max_tokens);
        let audio = build_audio_service(&config)?;

        info!(
            "Services ready - llm: {}/{}, audio: {}",
            config.llm_provider, config.llm_model, config.audio_provider
        );
        Ok(Self::new(config, summarizer, FileParser::new(), audio))
    }

    /// Validate text submitted directly by the client
    pub fn direct_request(
        &self,
        text: String,
        max_length: Option<u32>,
        style: Option<&str>,
    ) -> Result<SummarizeRequest> {
        let limit = self.config.max_chars;
        if text.chars().count() > limit {
            return Err(SummaristError::validation(format!(
                "text must be at most {} characters",
                limit
            )));
        }
        build_request(text, max_length, style)
    }

    /// Build a request from extracted text, clipping it to the configured limit
    pub fn extracted_request(
        &self,
        text: String,
        max_length: Option<u32>,
        style: Option<&str>,
    ) -> Result<SummarizeRequest> {
        let limit = self.config.max_chars;
        let text = match text.char_indices().nth(limit) {
            Some((cut, _)) => {
                warn!("Extracted text exceeds {} characters, truncating", limit);
                text[..cut].to_string()
            }
            None => text,
        };
        build_request(text, max_length, style)
    }
}

fn build_request(
    text: String,
    max_length: Option<u32>,
    style: Option<&str>,
) -> Result<SummarizeRequest> {
    let style = style.map(str::parse::<Style>).transpose()?.unwrap_or_default();
    SummarizeRequest::new(text, max_length.unwrap_or(DEFAULT_MAX_LENGTH), style)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_state, MockLlm};

    const TEXT: &str = "The quarterly report shows steady growth across all regions this year.";

    #[test]
    fn test_direct_request_defaults() {
        let state = test_state(MockLlm::new("ok"));
        let request = state.direct_request(TEXT.to_string(), None, None).unwrap();
        assert_eq!(request.max_length(), 200);
        assert_eq!(request.style(), summarist_llm::Style::Paragraph);
    }

    #[test]
    fn test_direct_request_rejects_overlong_text() {
        let mut state = test_state(MockLlm::new("ok"));
        state.config.max_chars = 60;
        let err = state
            .direct_request(TEXT.to_string(), None, Some("bullet"))
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_extracted_request_truncates() {
        let mut state = test_state(MockLlm::new("ok"));
        state.config.max_chars = 60;
        let request = state
            .extracted_request(format!("{} {}", TEXT, TEXT), Some(100), Some("tldr"))
            .unwrap();
        assert_eq!(request.text().chars().count(), 60);
        assert_eq!(request.max_length(), 100);
    }

    #[test]
    fn test_unknown_style_is_a_validation_error() {
        let state = test_state(MockLlm::new("ok"));
        let err = state
            .direct_request(TEXT.to_string(), None, Some("haiku"))
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
