//! Broadcast hub and streaming surface for emas-live.
//!
//! The hub owns the registry of connected subscribers and pushes state
//! snapshots to them with per-subscriber backpressure: every subscriber has
//! a small bounded queue, and a publish that cannot enqueue immediately is
//! dropped for that subscriber only. Slow consumers lose intermediate
//! updates; nobody else stalls.
//!
//! The streaming surface is axum: `/api/state` for pull-style snapshot
//! reads, `/ws` for persistent subscriptions, `/metrics` for Prometheus.

pub mod config;
pub mod error;
pub mod hub;
pub mod server;
mod session;

pub use config::{HubConfig, ServerConfig};
pub use error::HubError;
pub use hub::{run_heartbeat, Hub, Registration, PING_MESSAGE, PONG_MESSAGE};
pub use server::{create_router, run_server, AppState};
