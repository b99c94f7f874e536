use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use summarist_common::{Result, SummaristError};

/// Minimum number of characters a text must have to be summarized
pub const MIN_TEXT_CHARS: usize = 50;

/// Accepted range for `max_length`
pub const MAX_LENGTH_RANGE: RangeInclusive<u32> = 50..=1000;

/// `max_length` used when the caller does not set one
pub const DEFAULT_MAX_LENGTH: u32 = 200;

/// Summary style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Paragraph,
    Bullet,
    Tldr,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Paragraph, Style::Bullet, Style::Tldr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Paragraph => "paragraph",
            Style::Bullet => "bullet",
            Style::Tldr => "tldr",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = SummaristError;

    fn from_str(s: &str) -> Result<Self> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| {
                SummaristError::validation(format!(
                    "Invalid style '{}'. Valid styles are paragraph, bullet, tldr",
                    s
                ))
            })
    }
}

/// Validated summarization request
///
/// Fields are private so a request can only exist in its validated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    text: String,
    max_length: u32,
    style: Style,
}

impl SummarizeRequest {
    /// Build a request, enforcing the text and length constraints
    pub fn new(text: impl Into<String>, max_length: u32, style: Style) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(SummaristError::validation("text must not be empty"));
        }

        let chars = text.chars().count();
        if chars < MIN_TEXT_CHARS {
            return Err(SummaristError::validation(format!(
                "text must be at least {} characters (got {})",
                MIN_TEXT_CHARS, chars
            )));
        }

        if !MAX_LENGTH_RANGE.contains(&max_length) {
            return Err(SummaristError::validation(format!(
                "max_length must be between {} and {} (got {})",
                MAX_LENGTH_RANGE.start(),
                MAX_LENGTH_RANGE.end(),
                max_length
            )));
        }

        Ok(Self {
            text,
            max_length,
            style,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn style(&self) -> Style {
        self.style
    }
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The part of a summary that is worth caching
///
/// Carries no timestamp: every access stamps its own `generated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSummary {
    pub summary: String,
    pub style: Style,
    pub model: String,
    pub prompt_word_count: usize,
    pub summary_word_count: usize,
}

/// Summarization result
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub summary: String,
    pub style: Style,
    pub model: String,
    pub prompt_word_count: usize,
    pub summary_word_count: usize,
    pub generated_at: DateTime<Utc>,
    pub audio: Option<Vec<u8>>,
}

impl SummaryResult {
    /// Rebuild a full result from a cache entry
    pub fn from_cached(cached: CachedSummary, generated_at: DateTime<Utc>) -> Self {
        Self {
            summary: cached.summary,
            style: cached.style,
            model: cached.model,
            prompt_word_count: cached.prompt_word_count,
            summary_word_count: cached.summary_word_count,
            generated_at,
            audio: None,
        }
    }

    /// Cacheable subset of this result
    pub fn to_cached(&self) -> CachedSummary {
        CachedSummary {
            summary: self.summary.clone(),
            style: self.style,
            model: self.model.clone(),
            prompt_word_count: self.prompt_word_count,
            summary_word_count: self.summary_word_count,
        }
    }

    /// Return a copy of this result carrying narrated audio
    pub fn with_audio(self, audio: Vec<u8>) -> Self {
        Self {
            audio: Some(audio),
            ..self
        }
    }
}

/// One increment of a streamed summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Text to append at `path`
    Delta { path: String, value: String },
    Done,
    Error { message: String },
}

impl StreamEvent {
    /// Path used for free-text summary deltas
    pub const SUMMARY_PATH: &'static str = "summary";

    pub fn summary_delta(value: impl Into<String>) -> Self {
        Self::Delta {
            path: Self::SUMMARY_PATH.to_string(),
            value: value.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// `Done` and `Error` end a stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}
