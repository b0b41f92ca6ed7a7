//! Core domain types for the emas-live gold-rate tracker.
//!
//! This crate provides the fundamental types shared across the system:
//! - `LiveState`: the single shared state document streamed to subscribers
//! - `RateUpdate`, `FxTick`, `TransferWindow`: its wire-format entries
//! - `Trend`: up/down/flat markers matching the dashboard wire format
//! - `format`: pure display-string formatting (rupiah grouping, profit
//!   tiers, WIB timestamps)

pub mod clock;
pub mod error;
pub mod format;
pub mod types;

pub use clock::{wib_now, ClockTime, WIB_OFFSET_SECS};
pub use error::{CoreError, Result};
pub use types::{
    FxTick, LiveState, RateCandidate, RateUpdate, TransferWindow, Trend, DEDUP_CAP,
    FX_HISTORY_CAP, HISTORY_CAP,
};
