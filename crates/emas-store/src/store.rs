//! The shared live-state document and its mutation discipline.
//!
//! Every compound update (validate → dedup → rebaseline → format → append →
//! cap) runs inside a single critical section, so a concurrent snapshot
//! observes either the whole update or none of it. The dedup set and the
//! comparison baseline live next to the document under the same lock.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Timelike};
use parking_lot::RwLock;
use tracing::error;

use emas_core::format;
use emas_core::{
    ClockTime, FxTick, LiveState, RateCandidate, RateUpdate, TransferWindow, Trend, DEDUP_CAP,
    FX_HISTORY_CAP, HISTORY_CAP,
};

/// Result of a transfer-window report.
///
/// The command interpreter renders a different acknowledgment per variant,
/// so this is richer than the plain applied/not-applied of the rate paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The window was written (or rewritten with a later entry time).
    Applied,
    /// An equal-or-earlier entry time is already recorded; nothing changed.
    AlreadyCovered,
    /// The reported entry time is after the current clock; nothing changed.
    InFuture,
}

struct StoreInner {
    doc: LiveState,
    /// Buying rate of the last *accepted* update; rejected candidates never
    /// move this.
    last_buy: Option<i64>,
    /// Accepted `created_at` identifiers, cleared and reseeded past
    /// [`DEDUP_CAP`].
    seen: HashSet<String>,
}

/// Thread-safe owner of the live state document.
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl StateStore {
    /// Create a store with an empty history and the placeholder info text.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                doc: LiveState::new(),
                last_buy: None,
                seen: HashSet::new(),
            }),
        }
    }

    /// Serialize the current document under the shared lock.
    pub fn snapshot_json(&self) -> String {
        let inner = self.inner.read();
        match serde_json::to_string(&inner.doc) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "state serialization failed");
                "{}".to_string()
            }
        }
    }

    /// Clone the current document. Intended for tests and the command
    /// interpreter; streaming paths use [`Self::snapshot_json`].
    pub fn snapshot(&self) -> LiveState {
        self.inner.read().doc.clone()
    }

    /// Apply a normalized primary-provider candidate.
    ///
    /// Rejects (returning `false`, mutating nothing) candidates with an
    /// empty timestamp, non-positive prices, or an already-seen timestamp.
    /// Accepted candidates are rendered against the previous accepted
    /// baseline and appended under the sliding-window cap.
    pub fn apply_rate(&self, candidate: RateCandidate) -> bool {
        if candidate.created_at.is_empty()
            || candidate.buying_rate <= 0
            || candidate.selling_rate <= 0
        {
            return false;
        }

        let mut inner = self.inner.write();
        if inner.seen.contains(&candidate.created_at) {
            return false;
        }

        let (status, diff) = match inner.last_buy {
            Some(last) if candidate.buying_rate > last => (Trend::Up, candidate.buying_rate - last),
            Some(last) if candidate.buying_rate < last => {
                (Trend::Down, candidate.buying_rate - last)
            }
            Some(_) => (Trend::Flat, 0),
            None => (Trend::Flat, 0),
        };

        inner.last_buy = Some(candidate.buying_rate);
        inner.seen.insert(candidate.created_at.clone());
        if inner.seen.len() > DEDUP_CAP {
            // Clear-and-reseed, not LRU: forgets everything but the
            // triggering entry.
            inner.seen.clear();
            inner.seen.insert(candidate.created_at.clone());
        }

        let buy_fmt = format::format_rupiah(candidate.buying_rate);
        let sell_fmt = format::format_rupiah(candidate.selling_rate);
        let diff_line = format::diff_display(diff, status);
        let [jt20, jt30, jt40, jt50] = format::PROFIT_TIERS.map(|(capital, principal)| {
            format::profit_display(candidate.buying_rate, candidate.selling_rate, capital, principal)
        });

        let update = RateUpdate {
            buying_rate: candidate.buying_rate,
            selling_rate: candidate.selling_rate,
            status,
            diff,
            waktu_display: format::waktu_display(&candidate.created_at, status),
            transaction_display: format::transaction_display(&buy_fmt, &sell_fmt, &diff_line),
            diff_display: diff_line,
            created_at: candidate.created_at,
            jt20,
            jt30,
            jt40,
            jt50,
        };

        inner.doc.history.push_back(update);
        if inner.doc.history.len() > HISTORY_CAP {
            inner.doc.history.pop_front();
        }
        true
    }

    /// Apply a secondary-provider tick.
    ///
    /// Applied only when the history is empty or the price differs from the
    /// most recent stored tick.
    pub fn apply_fx_tick(&self, price: &str, observed_at: &str) -> bool {
        let mut inner = self.inner.write();
        if inner
            .doc
            .usd_idr_history
            .back()
            .is_some_and(|last| last.price == price)
        {
            return false;
        }
        inner.doc.usd_idr_history.push_back(FxTick {
            price: price.to_string(),
            time: observed_at.to_string(),
        });
        if inner.doc.usd_idr_history.len() > FX_HISTORY_CAP {
            inner.doc.usd_idr_history.pop_front();
        }
        true
    }

    /// Replace the annotation text. Escaping is the caller's concern.
    pub fn set_info_text(&self, text: impl Into<String>) {
        self.inner.write().doc.treasury_info = text.into();
    }

    /// Overwrite the transfer window without any ordering check.
    pub fn set_transfer_window(&self, window: TransferWindow) {
        self.inner.write().doc.transfer_jam = window;
    }

    /// Reset the transfer window to unset.
    pub fn clear_transfer_window(&self) {
        self.inner.write().doc.transfer_jam = TransferWindow::default();
    }

    /// Read the current transfer window.
    pub fn transfer_window(&self) -> TransferWindow {
        self.inner.read().doc.transfer_jam.clone()
    }

    /// Apply a reported transfer entry time against the supplied clock.
    ///
    /// The ordering check and the write share one critical section, so two
    /// concurrent reports cannot interleave into a lost update. An entry
    /// time after `now` is rejected outright; an entry time not strictly
    /// later than the recorded one is treated as a duplicate report.
    pub fn apply_transfer_report(
        &self,
        entered: ClockTime,
        now: DateTime<FixedOffset>,
    ) -> TransferOutcome {
        let now_minutes = i64::from(now.hour() * 60 + now.minute());
        let entered_minutes = i64::from(entered.minutes_of_day());
        if entered_minutes > now_minutes {
            return TransferOutcome::InFuture;
        }

        let mut inner = self.inner.write();
        if inner.doc.transfer_jam.is_set() {
            if let Ok(existing) = inner.doc.transfer_jam.jam_masuk.parse::<ClockTime>() {
                if entered_minutes <= i64::from(existing.minutes_of_day()) {
                    return TransferOutcome::AlreadyCovered;
                }
            }
        }

        let duration_minutes = (now_minutes - entered_minutes).max(0);
        inner.doc.transfer_jam = TransferWindow {
            jam_masuk: entered.to_string(),
            durasi: format::format_duration(duration_minutes),
            last_update: now.format("%H:%M").to_string(),
        };
        TransferOutcome::Applied
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
