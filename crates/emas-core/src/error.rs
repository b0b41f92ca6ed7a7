//! Error types for emas-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
