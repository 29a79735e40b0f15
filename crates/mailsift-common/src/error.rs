//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for mailsift operations
pub type Result<T> = std::result::Result<T, MailsiftError>;

/// Main error type for mailsift
#[derive(Error, Debug)]
pub enum MailsiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
