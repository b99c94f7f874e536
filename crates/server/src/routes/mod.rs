pub mod health;
pub mod summarize;
pub mod transcribe;
pub mod upload;
