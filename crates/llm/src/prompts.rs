//! Prompt templates for summarization
//!
//! Templates live on disk (`base.txt` plus one `<style>.txt` per style) and
//! are read on every call, so edits take effect without a restart.

use std::path::{Path, PathBuf};
use summarist_common::{Result, SummaristError};

use crate::types::Style;

/// File holding the system prompt
pub const SYSTEM_PROMPT_FILE: &str = "base.txt";

/// Placeholder substituted with the requested `max_length`
pub const MAX_LENGTH_PLACEHOLDER: &str = "{max_length}";

/// Separator between the style instruction and the text to summarize
pub const TEXT_HEADER: &str = "\n\nText to summarize:\n";

/// Renders system and user prompts from the template directory
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    prompts_dir: PathBuf,
}

impl PromptBuilder {
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
        }
    }

    pub fn prompts_dir(&self) -> &Path {
        &self.prompts_dir
    }

    /// Load the fixed system prompt
    pub async fn build_system_prompt(&self) -> Result<String> {
        self.load(SYSTEM_PROMPT_FILE).await
    }

    /// Fill the style template and append the text to summarize
    pub async fn build_user_prompt(
        &self,
        text: &str,
        style: Style,
        max_length: u32,
    ) -> Result<String> {
        let template = self.load(&format!("{}.txt", style.as_str())).await?;
        let instruction = template.replace(MAX_LENGTH_PLACEHOLDER, &max_length.to_string());

        Ok(format!("{}{}{}", instruction, TEXT_HEADER, text))
    }

    async fn load(&self, file_name: &str) -> Result<String> {
        let path = self.prompts_dir.join(file_name);

        tokio::fs::read_to_string(&path).await.map_err(|e| {
            SummaristError::config(format!(
                "Prompt template '{}' not found in {}: {}",
                file_name,
                self.prompts_dir.display(),
                e
            ))
        })
    }
}
