//! Error types for the agent domain and repository.

use thiserror::Error;

/// Agent domain error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed agent row: {0}")]
    Decode(String),

    #[error("repository operation failed: {0}")]
    Repository(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
