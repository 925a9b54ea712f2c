//! Error types for wayfarer-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Browser operation or sandbox failure
    #[error(transparent)]
    Operation(#[from] wayfarer_core::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
