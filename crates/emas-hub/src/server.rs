//! HTTP server: snapshot endpoint, WebSocket upgrade, metrics.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use emas_store::StateStore;
use emas_telemetry::render_metrics;

use crate::config::ServerConfig;
use crate::error::HubResult;
use crate::hub::Hub;
use crate::session::handle_socket;

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<StateStore>,
    hub: Arc<Hub>,
}

impl AppState {
    pub fn new(store: Arc<StateStore>, hub: Arc<Hub>) -> Self {
        Self { store, hub }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/ws", get(ws_handler))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Pull-style endpoint returning the current snapshot verbatim.
async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.store.snapshot_json(),
    )
}

/// WebSocket upgrade into a subscriber session. The capacity check happens
/// inside the session so the peer can be told the close reason.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Prometheus text exposition.
async fn get_metrics() -> Response {
    match render_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Bind and serve until the shutdown token fires.
pub async fn run_server(
    store: Arc<StateStore>,
    hub: Arc<Hub>,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> HubResult<()> {
    let app = create_router(AppState::new(store, hub));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(port = config.port, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
