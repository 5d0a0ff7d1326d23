//! Error types for the batcher

use thiserror::Error;

/// Result type alias for the batcher
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for the batcher
///
/// Only batch-level failures are represented here. Per-request validation
/// failures and transport failures never surface as a `BatchError`; they are
/// recorded in the results mapping instead.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A task could not be prepared for dispatch; aborts the whole batch
    #[error("Failed to prepare request '{name}': {message}")]
    Preparation { name: String, message: String },

    /// A dispatched task died before producing a result
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Error reported by an installed transport override
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid batch input (not a request or a sequence of requests)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
