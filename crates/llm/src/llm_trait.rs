use async_trait::async_trait;
use futures::stream::BoxStream;
use summarist_common::Result;

/// Lazy, finite sequence of generated text fragments
///
/// A mid-stream failure is delivered as a single `Err` item, after which the
/// stream ends. Dropping the stream releases the upstream connection.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Common trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier reported in summary results
    fn model(&self) -> &str;

    /// Generate the full completion
    async fn complete(&self, system_prompt: &str, user_prompt: &str, max_tokens: u32)
        -> Result<String>;

    /// Generate the completion incrementally
    async fn stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<FragmentStream>;
}
