//! Wire-format types for the shared state document.
//!
//! Every struct here serializes to the exact JSON shape the dashboard
//! clients consume; field names are part of the protocol and must not
//! change.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum retained rate updates: one per minute per day, plus one.
pub const HISTORY_CAP: usize = 1441;

/// Maximum retained USD/IDR ticks.
pub const FX_HISTORY_CAP: usize = 11;

/// Maximum remembered `created_at` identifiers before the dedup set is
/// cleared and reseeded with the triggering entry.
pub const DEDUP_CAP: usize = 5000;

/// Price movement relative to the previous accepted rate.
///
/// Serialized as the literal marker strings the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "🚀")]
    Up,
    #[serde(rename = "🔻")]
    Down,
    #[serde(rename = "➖")]
    Flat,
}

impl Trend {
    /// The marker string, as rendered into display fields.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Up => "🚀",
            Self::Down => "🔻",
            Self::Flat => "➖",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// One accepted gold-rate update with computed trend and display text.
///
/// Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateUpdate {
    /// Buying rate in rupiah per gram.
    pub buying_rate: i64,
    /// Selling rate in rupiah per gram.
    pub selling_rate: i64,
    /// Movement relative to the previous accepted update.
    pub status: Trend,
    /// Signed buying-rate delta against the previous accepted update.
    pub diff: i64,
    /// Provider-supplied update timestamp, also the dedup key.
    pub created_at: String,
    /// Weekday + time + marker, pre-rendered.
    pub waktu_display: String,
    /// Signed delta, pre-rendered.
    pub diff_display: String,
    /// Buy/sell/delta summary line, pre-rendered.
    pub transaction_display: String,
    /// Profit projection for a 20jt purchase.
    pub jt20: String,
    /// Profit projection for a 30jt purchase.
    pub jt30: String,
    /// Profit projection for a 40jt purchase.
    pub jt40: String,
    /// Profit projection for a 50jt purchase.
    pub jt50: String,
}

/// A normalized candidate from the primary provider, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCandidate {
    pub buying_rate: i64,
    pub selling_rate: i64,
    pub created_at: String,
}

/// One accepted USD/IDR observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxTick {
    /// Provider-formatted price string, kept verbatim.
    pub price: String,
    /// Local (WIB) time of day the tick was observed, `HH:MM:SS`.
    pub time: String,
}

/// Externally reported transfer event window.
///
/// Written only by the command interpreter; empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferWindow {
    /// Reported entry time of day, `HH:MM`.
    pub jam_masuk: String,
    /// Elapsed duration since entry, pre-rendered.
    pub durasi: String,
    /// Local time the window was last updated, `HH:MM`.
    pub last_update: String,
}

impl TransferWindow {
    /// Whether a window has been reported since the last reset.
    pub fn is_set(&self) -> bool {
        !self.jam_masuk.is_empty()
    }
}

/// The single shared state document, serialized verbatim as one snapshot
/// per publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveState {
    /// Rolling gold-rate history, newest last.
    pub history: VecDeque<RateUpdate>,
    /// Rolling USD/IDR history, newest last.
    pub usd_idr_history: VecDeque<FxTick>,
    /// Free-form annotation set by the command interpreter.
    pub treasury_info: String,
    /// Current transfer window, if any.
    pub transfer_jam: TransferWindow,
}

impl LiveState {
    /// Fresh document with the placeholder annotation.
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
            usd_idr_history: VecDeque::new(),
            treasury_info: "Belum ada info treasury.".to_string(),
            transfer_jam: TransferWindow::default(),
        }
    }
}

impl Default for LiveState {
    fn default() -> Self {
        Self::new()
    }
}
