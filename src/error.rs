//! Cellflow error types

use thiserror::Error;

/// Cellflow error type
#[derive(Error, Debug)]
pub enum Error {
    /// Pipeline lifecycle error
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Hypothesis validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Verdict aggregation error
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for cellflow operations
pub type Result<T> = std::result::Result<T, Error>;
