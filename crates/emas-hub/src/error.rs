//! Error types for emas-hub.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit {max})")]
    AtCapacity { max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HubResult<T> = Result<T, HubError>;
