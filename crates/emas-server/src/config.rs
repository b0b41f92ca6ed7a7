//! Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use emas_feed::FeedConfig;
use emas_hub::{HubConfig, ServerConfig};

use crate::error::{AppError, AppResult};

/// Application configuration, one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Fan-out hub configuration.
    #[serde(default)]
    pub hub: HubConfig,
    /// Poll loop configuration.
    #[serde(default)]
    pub feed: FeedConfig,
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("EMAS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.hub.max_subscribers, 500);
        assert_eq!(config.feed.rate_interval_ms, 10);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9001

            [hub]
            max_subscribers = 100

            [feed]
            rate_interval_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.hub.max_subscribers, 100);
        assert_eq!(config.hub.queue_capacity, 8);
        assert_eq!(config.feed.rate_interval_ms, 50);
        assert_eq!(config.feed.fx_interval_ms, 200);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("max_subscribers"));
        assert!(toml_str.contains("rate_url"));
    }
}
