//! Summarist LLM Integration
//!
//! Prompt rendering, provider clients, the summary cache and the
//! summarization service that ties them together.

mod anthropic;
mod cache;
mod client;
mod factory;
mod llm_trait;
mod prompts;
mod streaming;
mod summarize;
mod types;

pub use anthropic::AnthropicClient;
pub use cache::{build_cache_store, cache_key, CacheStore, KvBackend, MemoryKv, RedisKv};
pub use client::OllamaClient;
pub use factory::{build_llm_client, LlmProvider};
pub use llm_trait::{FragmentStream, LlmClient};
pub use prompts::PromptBuilder;
pub use summarize::{EventStream, SummarizerService};
pub use types::{
    word_count, CachedSummary, StreamEvent, Style, SummarizeRequest, SummaryResult,
    DEFAULT_MAX_LENGTH, MAX_LENGTH_RANGE, MIN_TEXT_CHARS,
};
