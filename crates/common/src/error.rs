/// Summarist error types
#[derive(Debug, thiserror::Error)]
pub enum SummaristError {
    /// Request field out of range or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller supplied an unusable file or payload
    #[error("{0}")]
    UserInput(String),

    /// Upload exceeds the accepted size
    #[error("{0}")]
    PayloadTooLarge(String),

    /// LLM / speech backend failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Cache backend failure (absorbed by the cache layer)
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SummaristError {
    /// Create validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create user input error
    pub fn user_input<S: Into<String>>(msg: S) -> Self {
        Self::UserInput(msg.into())
    }

    /// Create payload too large error
    pub fn payload_too_large<S: Into<String>>(msg: S) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    /// Create provider error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::Provider(msg.into())
    }

    /// Create cache error
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

// HTTP response conversion (used by the actix-web layer)
impl SummaristError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::UserInput(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::Provider(_) => 502,
            Self::Cache(_) => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Other(_) => 500,
        }
    }

    /// Whether the caller's input is the cause (4xx family)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
