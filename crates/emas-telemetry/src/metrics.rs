//! Prometheus metrics for emas-live.
//!
//! Covers the paths where something is silently absorbed (dropped fan-out
//! messages, skipped fetch iterations, rejected registrations) so staleness
//! is still observable.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally: a registration
//! failure means duplicate metric names, a startup-time configuration error
//! that should crash immediately. These panics only occur during static
//! initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Currently registered subscribers.
pub static SUBSCRIBERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("emas_hub_subscribers", "Currently registered subscribers").unwrap()
});

/// Snapshots published to the hub.
pub static BROADCASTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "emas_hub_broadcasts_total",
        "Snapshot publishes fanned out to subscribers"
    )
    .unwrap()
});

/// Messages dropped because a subscriber queue was full.
/// Labels: kind (snapshot/ping/pong)
pub static MESSAGES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "emas_hub_dropped_total",
        "Messages dropped on full subscriber queues",
        &["kind"]
    )
    .unwrap()
});

/// Registrations rejected at the subscriber cap.
pub static REGISTRATIONS_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "emas_hub_registrations_rejected_total",
        "Connections rejected at the subscriber cap"
    )
    .unwrap()
});

/// Updates accepted into the store.
/// Labels: source (rate/fx)
pub static UPDATES_APPLIED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "emas_store_updates_total",
        "Updates accepted into the state document",
        &["source"]
    )
    .unwrap()
});

/// Fetch iterations skipped on provider errors.
/// Labels: source (rate/fx)
pub static FETCH_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "emas_feed_fetch_errors_total",
        "Fetch iterations skipped on provider errors",
        &["source"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Update the subscriber gauge.
    pub fn subscribers_set(count: usize) {
        SUBSCRIBERS.set(count as i64);
    }

    /// Record a snapshot publish.
    pub fn broadcast_sent() {
        BROADCASTS_TOTAL.inc();
    }

    /// Record a message dropped on a full subscriber queue.
    pub fn message_dropped(kind: &str) {
        MESSAGES_DROPPED_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a registration rejected at the cap.
    pub fn registration_rejected() {
        REGISTRATIONS_REJECTED_TOTAL.inc();
    }

    /// Record an accepted update.
    pub fn update_applied(source: &str) {
        UPDATES_APPLIED_TOTAL.with_label_values(&[source]).inc();
    }

    /// Record a skipped fetch iteration.
    pub fn fetch_error(source: &str) {
        FETCH_ERRORS_TOTAL.with_label_values(&[source]).inc();
    }
}

/// Render all registered metrics in the Prometheus text format.
pub fn render_metrics() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&prometheus::gather())
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
