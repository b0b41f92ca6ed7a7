//! Application assembly and lifecycle.
//!
//! Everything shared is constructed here and handed to the tasks as `Arc`
//! handles; there are no process-wide singletons. Shutdown flows from
//! ctrl-c through one cancellation token into every task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use emas_feed::{run_fx_poller, run_rate_poller, FxQuoteClient, TreasuryClient};
use emas_hub::{run_heartbeat, run_server, Hub};
use emas_store::StateStore;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// The assembled service.
pub struct Application {
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run until ctrl-c or a server failure.
    pub async fn run(self) -> AppResult<()> {
        let store = Arc::new(StateStore::new());
        let hub = Arc::new(Hub::new(store.clone(), self.config.hub.clone()));
        let shutdown = CancellationToken::new();

        let timeout = self.config.feed.request_timeout();
        let rate_provider = TreasuryClient::new(self.config.feed.rate_url.clone(), timeout)?;
        let fx_provider = FxQuoteClient::new(self.config.feed.fx_url.clone(), timeout)?;

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        tasks.push(tokio::spawn(run_rate_poller(
            rate_provider,
            store.clone(),
            hub.clone(),
            self.config.feed.rate_interval(),
            shutdown.clone(),
        )));
        tasks.push(tokio::spawn(run_fx_poller(
            fx_provider,
            store.clone(),
            hub.clone(),
            self.config.feed.fx_interval(),
            shutdown.clone(),
        )));
        tasks.push(tokio::spawn(run_heartbeat(hub.clone(), shutdown.clone())));

        let mut server = tokio::spawn(run_server(
            store,
            hub,
            self.config.server.clone(),
            shutdown.clone(),
        ));

        let mut result: AppResult<()> = Ok(());
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
            joined = &mut server => {
                result = match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!(error = %e, "Server failed");
                        Err(e.into())
                    }
                    Err(e) => Err(AppError::Runtime(format!("server task panicked: {e}"))),
                };
            }
        }

        info!("Shutting down");
        shutdown.cancel();
        for task in tasks {
            let _ = task.await;
        }
        if !server.is_finished() {
            let _ = server.await;
        }

        result
    }
}
