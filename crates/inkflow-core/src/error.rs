//! Engine errors.

use thiserror::Error;

/// Errors from fallible engine operations (parsing and validating state).
///
/// Guard rejections during drawing are not errors; those operations return
/// `false`/`None` and log a warning.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
