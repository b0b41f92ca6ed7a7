//! Polling feeds for emas-live.
//!
//! One independent, indefinitely repeating task per external source. Each
//! iteration fetches through a provider seam, normalizes the payload into a
//! candidate, submits it to the store, and publishes a fresh snapshot when
//! the store accepts it. Failures skip the iteration; the fixed poll
//! interval is the retry.

pub mod config;
pub mod error;
pub mod poller;
pub mod provider;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use poller::{run_fx_poller, run_rate_poller};
pub use provider::{FxProvider, FxQuoteClient, RateProvider, TreasuryClient};
