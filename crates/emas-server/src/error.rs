//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] emas_feed::FeedError),

    #[error("Hub error: {0}")]
    Hub(#[from] emas_hub::HubError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] emas_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

pub type AppResult<T> = Result<T, AppError>;
