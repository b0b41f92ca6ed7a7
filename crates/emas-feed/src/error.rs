//! Error types for emas-feed.

use thiserror::Error;

/// Feed error types. All of these are recovered locally by skipping the
/// iteration; none propagate past the poll loop.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Result type alias for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
