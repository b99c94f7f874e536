use crate::error::SummaristError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which key-value engine backs the summary cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Shared Redis instance
    Redis,
    /// In-process map with expiry
    Memory,
    /// Caching disabled, every lookup misses
    None,
}

impl FromStr for CacheBackendKind {
    type Err = SummaristError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(SummaristError::config(format!(
                "Unsupported cache backend '{}'. Supported: redis, memory, none",
                other
            ))),
        }
    }
}

/// Summarist application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name reported by /health
    pub app_name: String,

    /// Application version reported by /health
    pub version: String,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// LLM provider identifier (anthropic, ollama)
    pub llm_provider: String,

    /// LLM model identifier
    pub llm_model: String,

    /// Default max_tokens for completions
    pub max_tokens: u32,

    /// Anthropic API key
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,

    /// Anthropic API base URL
    pub anthropic_base_url: String,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Speech provider identifier (openai)
    pub audio_provider: String,

    /// OpenAI API key (speech features)
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    pub openai_base_url: String,

    /// Speech-to-text model
    pub whisper_model: String,

    /// Text-to-speech model
    pub tts_model: String,

    /// Text-to-speech voice
    pub tts_voice: String,

    /// Cache backend identifier (redis, memory, none)
    pub cache_backend: String,

    /// Redis connection URL
    pub redis_url: String,

    /// Cache entry time-to-live in seconds
    pub cache_ttl_secs: u64,

    /// Directory holding the prompt templates
    pub prompts_dir: PathBuf,

    /// Maximum characters accepted for summarization
    pub max_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "summarist".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: None,
            log_level: "info".to_string(),
            llm_provider: "anthropic".to_string(),
            llm_model: "claude-sonnet-4-6".to_string(),
            max_tokens: 1024,
            anthropic_api_key: None,
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            audio_provider: "openai".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com".to_string(),
            whisper_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            cache_backend: "redis".to_string(),
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            cache_ttl_secs: 86_400,
            prompts_dir: PathBuf::from("./prompts"),
            max_chars: 20_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SummaristError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            app_name: Self::get_env_string("APP_NAME", defaults.app_name),
            version: defaults.version,
            server_host: Self::get_env_string("SERVER_HOST", defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT", defaults.server_port)?,
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            log_level: Self::get_env_string("LOG_LEVEL", defaults.log_level),
            llm_provider: Self::get_env_string("LLM_PROVIDER", defaults.llm_provider),
            llm_model: Self::get_env_string("LLM_MODEL", defaults.llm_model),
            max_tokens: Self::get_env_parsed("LLM_MAX_TOKENS", defaults.max_tokens)?,
            anthropic_api_key: Self::get_env_secret("ANTHROPIC_API_KEY"),
            anthropic_base_url: Self::get_env_string(
                "ANTHROPIC_BASE_URL",
                defaults.anthropic_base_url,
            ),
            ollama_base_url: Self::get_env_string("OLLAMA_BASE_URL", defaults.ollama_base_url),
            audio_provider: Self::get_env_string("AUDIO_PROVIDER", defaults.audio_provider),
            openai_api_key: Self::get_env_secret("OPENAI_API_KEY"),
            openai_base_url: Self::get_env_string("OPENAI_BASE_URL", defaults.openai_base_url),
            whisper_model: Self::get_env_string("WHISPER_MODEL", defaults.whisper_model),
            tts_model: Self::get_env_string("TTS_MODEL", defaults.tts_model),
            tts_voice: Self::get_env_string("TTS_VOICE", defaults.tts_voice),
            cache_backend: Self::get_env_string("CACHE_BACKEND", defaults.cache_backend),
            redis_url: Self::get_env_string("REDIS_URL", defaults.redis_url),
            cache_ttl_secs: Self::get_env_parsed("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            prompts_dir: std::env::var("PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.prompts_dir),
            max_chars: Self::get_env_parsed("MAX_CHARS", defaults.max_chars)?,
        };

        config.validate()?;

        Ok(config)
    }

    fn get_env_string(key: &str, default: String) -> String {
        std::env::var(key).unwrap_or(default)
    }

    /// Empty values count as unset
    fn get_env_secret(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn get_env_parsed<T: FromStr>(key: &str, default: T) -> Result<T, SummaristError> {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                SummaristError::config(format!("Invalid value for {}: '{}'", key, raw))
            }),
            Err(_) => Ok(default),
        }
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Resolved cache backend
    pub fn cache_backend_kind(&self) -> Result<CacheBackendKind, SummaristError> {
        self.cache_backend.parse()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SummaristError> {
        if self.server_port == 0 {
            return Err(SummaristError::config("Server port cannot be 0"));
        }

        if self.llm_model.trim().is_empty() {
            return Err(SummaristError::config("LLM model name cannot be empty"));
        }

        if self.max_tokens == 0 {
            return Err(SummaristError::config("LLM_MAX_TOKENS must be greater than 0"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(SummaristError::config("CACHE_TTL_SECS must be greater than 0"));
        }

        for (name, url) in [
            ("ANTHROPIC_BASE_URL", &self.anthropic_base_url),
            ("OLLAMA_BASE_URL", &self.ollama_base_url),
            ("OPENAI_BASE_URL", &self.openai_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SummaristError::config(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        self.cache_backend_kind()?;

        Ok(())
    }
}
