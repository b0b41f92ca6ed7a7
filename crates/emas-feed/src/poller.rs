//! The periodic fetch loops.
//!
//! Each loop owns its provider and never shares a call path with the other,
//! so a slow or failing source cannot stall its sibling. An accepted update
//! immediately publishes a fresh snapshot; there is no batching between
//! mutation and fan-out.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use emas_core::wib_now;
use emas_hub::Hub;
use emas_store::StateStore;
use emas_telemetry::Metrics;

use crate::provider::{FxProvider, RateProvider};

/// Run the primary (gold rate) poll loop until cancelled.
pub async fn run_rate_poller<P: RateProvider>(
    provider: P,
    store: Arc<StateStore>,
    hub: Arc<Hub>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    info!(interval_ms = interval.as_millis() as u64, "rate poller started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = provider.fetch() => match result {
                Ok(candidate) => {
                    if store.apply_rate(candidate) {
                        Metrics::update_applied("rate");
                        hub.publish(store.snapshot_json());
                    }
                }
                Err(e) => {
                    Metrics::fetch_error("rate");
                    debug!(error = %e, "rate fetch skipped");
                }
            },
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!("rate poller stopped");
}

/// Run the secondary (USD/IDR) poll loop until cancelled.
pub async fn run_fx_poller<P: FxProvider>(
    provider: P,
    store: Arc<StateStore>,
    hub: Arc<Hub>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    info!(interval_ms = interval.as_millis() as u64, "fx poller started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = provider.fetch() => match result {
                Ok(price) => {
                    let observed_at = wib_now().format("%H:%M:%S").to_string();
                    if store.apply_fx_tick(&price, &observed_at) {
                        Metrics::update_applied("fx");
                        hub.publish(store.snapshot_json());
                    }
                }
                Err(e) => {
                    Metrics::fetch_error("fx");
                    debug!(error = %e, "fx fetch skipped");
                }
            },
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!("fx poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FeedError, FeedResult};
    use emas_core::RateCandidate;
    use emas_hub::HubConfig;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Provider replaying a fixed script, then failing forever.
    struct ScriptedRates {
        script: Mutex<VecDeque<FeedResult<RateCandidate>>>,
    }

    impl ScriptedRates {
        fn new(script: Vec<FeedResult<RateCandidate>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl RateProvider for ScriptedRates {
        async fn fetch(&self) -> FeedResult<RateCandidate> {
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(FeedError::Request("script exhausted".to_string())))
        }
    }

    struct ScriptedFx {
        script: Mutex<VecDeque<FeedResult<String>>>,
    }

    impl FxProvider for ScriptedFx {
        async fn fetch(&self) -> FeedResult<String> {
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(FeedError::Request("script exhausted".to_string())))
        }
    }

    fn candidate(buy: i64, ts: &str) -> RateCandidate {
        RateCandidate {
            buying_rate: buy,
            selling_rate: buy - 30_000,
            created_at: ts.to_string(),
        }
    }

    #[tokio::test]
    async fn test_rate_poller_applies_and_publishes() {
        let store = Arc::new(StateStore::new());
        let hub = Arc::new(Hub::new(store.clone(), HubConfig::default()));
        let mut reg = hub.register().unwrap();
        // Drain the initial snapshot.
        reg.rx.recv().await.unwrap();

        let provider = ScriptedRates::new(vec![
            Ok(candidate(1_000_000, "t1")),
            Err(FeedError::Request("timeout".to_string())),
            Ok(candidate(1_000_000, "t1")), // duplicate: accepted by nobody
            Ok(candidate(1_050_000, "t2")),
        ]);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_rate_poller(
            provider,
            store.clone(),
            hub.clone(),
            Duration::from_millis(1),
            shutdown.clone(),
        ));

        // Two accepted updates, two published snapshots.
        let first = reg.rx.recv().await.unwrap();
        assert!(first.contains("\"created_at\":\"t1\""));
        let second = reg.rx.recv().await.unwrap();
        assert!(second.contains("\"created_at\":\"t2\""));

        shutdown.cancel();
        handle.await.unwrap();

        let doc = store.snapshot();
        assert_eq!(doc.history.len(), 2);
    }

    #[tokio::test]
    async fn test_fx_poller_dedups_repeated_quotes() {
        let store = Arc::new(StateStore::new());
        let hub = Arc::new(Hub::new(store.clone(), HubConfig::default()));

        let provider = ScriptedFx {
            script: Mutex::new(
                vec![
                    Ok("16,250".to_string()),
                    Ok("16,250".to_string()),
                    Ok("16,260".to_string()),
                ]
                .into(),
            ),
        };

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_fx_poller(
            provider,
            store.clone(),
            hub,
            Duration::from_millis(1),
            shutdown.clone(),
        ));

        // Give the script time to drain, then stop.
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let doc = store.snapshot();
        let prices: Vec<_> = doc.usd_idr_history.iter().map(|t| t.price.as_str()).collect();
        assert_eq!(prices, vec!["16,250", "16,260"]);
    }

    #[tokio::test]
    async fn test_poller_stops_on_cancellation() {
        let store = Arc::new(StateStore::new());
        let hub = Arc::new(Hub::new(store.clone(), HubConfig::default()));
        let provider = ScriptedRates::new(vec![]);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_rate_poller(
            provider,
            store,
            hub,
            Duration::from_secs(3600),
            shutdown.clone(),
        ));

        shutdown.cancel();
        // Cancellation is honored at the sleep suspension point.
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
