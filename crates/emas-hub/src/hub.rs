//! Subscriber registry and non-blocking fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use emas_store::StateStore;
use emas_telemetry::Metrics;

use crate::config::HubConfig;
use crate::error::HubError;

/// Liveness probe pushed to every subscriber on the heartbeat period.
pub const PING_MESSAGE: &str = r#"{"ping":true}"#;

/// Acknowledgment for an inbound `ping` control token.
pub const PONG_MESSAGE: &str = r#"{"pong":true}"#;

/// A successful registration: the subscriber's queue ends plus its id.
///
/// `rx` is drained by the session's outbound task; `tx` lets the session's
/// read loop enqueue control acknowledgments through the same bounded queue.
pub struct Registration {
    pub id: u64,
    pub rx: mpsc::Receiver<String>,
    pub tx: mpsc::Sender<String>,
}

/// Registry of connected subscribers and the publish path.
///
/// The registry mutex is held only for insert/remove/iterate; enqueues are
/// `try_send`, so [`Hub::publish`] is bounded-time regardless of consumer
/// speed.
pub struct Hub {
    store: Arc<StateStore>,
    subscribers: Mutex<HashMap<u64, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    config: HubConfig,
}

impl Hub {
    pub fn new(store: Arc<StateStore>, config: HubConfig) -> Self {
        Self {
            store,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Register a new subscriber.
    ///
    /// Rejects at the capacity cap without touching the registry. On
    /// success the subscriber immediately has one full snapshot queued, so
    /// new connections are never empty until the next update.
    pub fn register(&self) -> Result<Registration, HubError> {
        let snapshot = self.store.snapshot_json();
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let id = {
            let mut subs = self.subscribers.lock();
            if subs.len() >= self.config.max_subscribers {
                drop(subs);
                Metrics::registration_rejected();
                return Err(HubError::AtCapacity {
                    max: self.config.max_subscribers,
                });
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            subs.insert(id, tx.clone());
            Metrics::subscribers_set(subs.len());
            id
        };
        // The queue is fresh, the initial snapshot always fits.
        let _ = tx.try_send(snapshot);
        debug!(id, "subscriber registered");
        Ok(Registration { id, rx, tx })
    }

    /// Remove a subscriber. Idempotent.
    pub fn unregister(&self, id: u64) {
        let mut subs = self.subscribers.lock();
        if subs.remove(&id).is_some() {
            debug!(id, "subscriber unregistered");
        }
        Metrics::subscribers_set(subs.len());
    }

    /// Push a snapshot to every subscriber, dropping it for any whose
    /// queue is full. Never blocks, never retries: the next publish
    /// supersedes whatever was dropped.
    pub fn publish(&self, payload: String) {
        self.fan_out(&payload, "snapshot");
        Metrics::broadcast_sent();
    }

    /// Push the liveness probe to every subscriber, same drop-if-full rule.
    pub fn broadcast_ping(&self) {
        self.fan_out(PING_MESSAGE, "ping");
    }

    fn fan_out(&self, payload: &str, kind: &str) {
        let subs = self.subscribers.lock();
        for (id, tx) in subs.iter() {
            if tx.try_send(payload.to_string()).is_err() {
                trace!(id, kind, "queue full, message dropped");
                Metrics::message_dropped(kind);
            }
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub(crate) fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.config.heartbeat_interval_secs)
    }
}

/// Periodic liveness probe task.
///
/// Pure keep-alive signaling: the probe never evicts a subscriber that
/// stops responding. Unresponsive peers are detected when their socket
/// write eventually fails.
pub async fn run_heartbeat(hub: Arc<Hub>, shutdown: CancellationToken) {
    let interval = hub.heartbeat_interval();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => hub.broadcast_ping(),
        }
    }
    debug!("heartbeat task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use emas_core::RateCandidate;
    use tokio::sync::mpsc::error::TryRecvError;

    fn test_hub(config: HubConfig) -> (Arc<StateStore>, Hub) {
        let store = Arc::new(StateStore::new());
        let hub = Hub::new(store.clone(), config);
        (store, hub)
    }

    fn rate(ts: &str) -> RateCandidate {
        RateCandidate {
            buying_rate: 1_000_000,
            selling_rate: 970_000,
            created_at: ts.to_string(),
        }
    }

    #[test]
    fn test_register_queues_initial_snapshot() {
        let (store, hub) = test_hub(HubConfig::default());
        assert!(store.apply_rate(rate("t1")));

        let mut reg = hub.register().unwrap();
        let first = reg.rx.try_recv().unwrap();
        assert!(first.contains("\"created_at\":\"t1\""));
        assert_eq!(reg.rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_capacity_cutoff_leaves_existing_untouched() {
        let (_store, hub) = test_hub(HubConfig {
            max_subscribers: 2,
            ..HubConfig::default()
        });

        let mut a = hub.register().unwrap();
        let mut b = hub.register().unwrap();
        assert!(matches!(
            hub.register(),
            Err(HubError::AtCapacity { max: 2 })
        ));
        assert_eq!(hub.subscriber_count(), 2);

        // Both survivors still receive publishes.
        a.rx.try_recv().unwrap();
        b.rx.try_recv().unwrap();
        hub.publish("{}".to_string());
        assert!(a.rx.try_recv().is_ok());
        assert!(b.rx.try_recv().is_ok());
    }

    #[test]
    fn test_publish_drops_when_queue_full_without_blocking() {
        let (_store, hub) = test_hub(HubConfig::default());
        let mut reg = hub.register().unwrap();

        // Queue holds the initial snapshot plus seven more; everything past
        // that is dropped for this subscriber only.
        for i in 0..20 {
            hub.publish(format!("{{\"seq\":{i}}}"));
        }

        let mut received = 0;
        while reg.rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 8);

        // A later publish goes through once the queue has drained.
        hub.publish("{\"seq\":99}".to_string());
        assert_eq!(reg.rx.try_recv().unwrap(), "{\"seq\":99}");
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let (_store, hub) = test_hub(HubConfig::default());
        let reg = hub.register().unwrap();
        assert_eq!(hub.subscriber_count(), 1);
        hub.unregister(reg.id);
        hub.unregister(reg.id);
        assert_eq!(hub.subscriber_count(), 0);
        // Publishing into an empty registry is a no-op.
        hub.publish("{}".to_string());
    }

    #[test]
    fn test_heartbeat_message_shape() {
        let (_store, hub) = test_hub(HubConfig::default());
        let mut reg = hub.register().unwrap();
        reg.rx.try_recv().unwrap();
        hub.broadcast_ping();
        assert_eq!(reg.rx.try_recv().unwrap(), PING_MESSAGE);
    }
}
