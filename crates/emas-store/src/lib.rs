//! Concurrent state store for emas-live.
//!
//! Owns the single shared [`emas_core::LiveState`] document behind one
//! reader/writer lock. Pollers and the command interpreter mutate it through
//! the compound operations here; the hub and the snapshot endpoint read it
//! through [`StateStore::snapshot_json`].

pub mod store;

pub use store::{StateStore, TransferOutcome};
