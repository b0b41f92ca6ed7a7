//! Hub and server configuration.

use serde::{Deserialize, Serialize};

/// Fan-out hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Maximum concurrent subscribers.
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,
    /// Outbound queue depth per subscriber.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Liveness probe period in seconds.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_max_subscribers() -> usize {
    500
}

fn default_queue_capacity() -> usize {
    8
}

fn default_heartbeat_interval_secs() -> u64 {
    15
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_subscribers: default_max_subscribers(),
            queue_capacity: default_queue_capacity(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}
