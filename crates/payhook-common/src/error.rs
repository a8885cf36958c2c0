//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for Payhook operations
pub type Result<T> = std::result::Result<T, PayhookError>;

/// Main error type for cross-cutting concerns
#[derive(Error, Debug)]
pub enum PayhookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}
