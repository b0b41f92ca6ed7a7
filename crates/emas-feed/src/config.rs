//! Feed configuration.
//!
//! The primary interval is deliberately near-busy (freshness over provider
//! load); it is a tunable, not a constant to be "fixed".

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for both poll loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Primary (gold rate) endpoint URL.
    #[serde(default = "default_rate_url")]
    pub rate_url: String,
    /// Primary poll interval in milliseconds.
    #[serde(default = "default_rate_interval_ms")]
    pub rate_interval_ms: u64,
    /// Secondary (USD/IDR quote) endpoint URL.
    #[serde(default = "default_fx_url")]
    pub fx_url: String,
    /// Secondary poll interval in milliseconds.
    #[serde(default = "default_fx_interval_ms")]
    pub fx_interval_ms: u64,
    /// Hard timeout per provider request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_rate_url() -> String {
    "https://api.treasury.id/api/v1/antigrvty/gold/rate".to_string()
}

fn default_rate_interval_ms() -> u64 {
    10
}

fn default_fx_url() -> String {
    "https://www.google.com/finance/quote/USD-IDR".to_string()
}

fn default_fx_interval_ms() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rate_url: default_rate_url(),
            rate_interval_ms: default_rate_interval_ms(),
            fx_url: default_fx_url(),
            fx_interval_ms: default_fx_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn rate_interval(&self) -> Duration {
        Duration::from_millis(self.rate_interval_ms)
    }

    pub fn fx_interval(&self) -> Duration {
        Duration::from_millis(self.fx_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
