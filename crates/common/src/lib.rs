pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, CacheBackendKind};
pub use error::SummaristError;
pub type Result<T> = std::result::Result<T, SummaristError>;
