use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use summarist_common::Result;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::llm_trait::LlmClient;
use crate::prompts::PromptBuilder;
use crate::types::{word_count, CachedSummary, StreamEvent, SummarizeRequest, SummaryResult};

/// Summary events in generation order, ending with exactly one terminal event
pub type EventStream = BoxStream<'static, StreamEvent>;

/// Summarization pipeline: cache, prompts, then the configured LLM
pub struct SummarizerService {
    llm: Arc<dyn LlmClient>,
    cache: CacheStore,
    prompts: PromptBuilder,
    max_tokens: u32,
}

impl SummarizerService {
    /// Create new summarizer
    pub fn new(
        llm: Arc<dyn LlmClient>,
        cache: CacheStore,
        prompts: PromptBuilder,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            cache,
            prompts,
            max_tokens,
        }
    }

    /// Produce a complete summary, served from cache when possible
    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<SummaryResult> {
        let (text, style, max_length) = (request.text(), request.style(), request.max_length());

        if let Some(cached) = self.cache.lookup(text, style, max_length).await {
            info!("Cache hit - style: {}, max_length: {}", style, max_length);
            return Ok(SummaryResult::from_cached(cached, Utc::now()));
        }
        info!(
            "Cache miss - style: {}, max_length: {}, text length: {} chars",
            style,
            max_length,
            text.chars().count()
        );

        let system_prompt = self.prompts.build_system_prompt().await?;
        let user_prompt = self.prompts.build_user_prompt(text, style, max_length).await?;

        let summary = self
            .llm
            .complete(&system_prompt, &user_prompt, self.max_tokens)
            .await?;

        let entry = CachedSummary {
            summary_word_count: word_count(&summary),
            prompt_word_count: word_count(text),
            summary,
            style,
            model: self.llm.model().to_string(),
        };
        self.cache.store(text, style, max_length, &entry).await;

        debug!("Summary generated - {} words", entry.summary_word_count);
        Ok(SummaryResult::from_cached(entry, Utc::now()))
    }

    /// Stream a summary as delta events
    ///
    /// Prompt and connection failures are returned before any event exists.
    /// A failure after that becomes the terminal [`StreamEvent::Error`].
    /// Streamed summaries bypass the cache.
    pub async fn summarize_stream(&self, request: &SummarizeRequest) -> Result<EventStream> {
        let system_prompt = self.prompts.build_system_prompt().await?;
        let user_prompt = self
            .prompts
            .build_user_prompt(request.text(), request.style(), request.max_length())
            .await?;

        info!(
            "Streaming summary - style: {}, max_length: {}",
            request.style(),
            request.max_length()
        );
        let fragments = self
            .llm
            .stream(&system_prompt, &user_prompt, self.max_tokens)
            .await?;

        let events = stream::unfold(Some(fragments), |state| async move {
            let mut fragments = state?;
            match fragments.next().await {
                Some(Ok(fragment)) => Some((StreamEvent::summary_delta(fragment), Some(fragments))),
                Some(Err(e)) => {
                    warn!("Summary stream failed: {}", e);
                    Some((StreamEvent::error(e.to_string()), None))
                }
                None => Some((StreamEvent::Done, None)),
            }
        });

        Ok(events.boxed())
    }
}
