//! Integration tests driving the streaming surface over real sockets.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use emas_core::RateCandidate;
use emas_hub::{create_router, AppState, Hub, HubConfig};
use emas_store::StateStore;

fn rate(buy: i64, ts: &str) -> RateCandidate {
    RateCandidate {
        buying_rate: buy,
        selling_rate: buy - 30_000,
        created_at: ts.to_string(),
    }
}

async fn spawn_server(store: Arc<StateStore>, hub: Arc<Hub>) -> std::net::SocketAddr {
    let app = create_router(AppState::new(store, hub));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_subscriber_gets_snapshot_pong_and_updates() {
    let store = Arc::new(StateStore::new());
    assert!(store.apply_rate(rate(1_000_000, "t1")));
    let hub = Arc::new(Hub::new(store.clone(), HubConfig::default()));
    let addr = spawn_server(store.clone(), hub.clone()).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();

    // New subscribers are never empty: the first frame is a full snapshot.
    let first = ws.next().await.unwrap().unwrap().into_text().unwrap();
    assert!(first.contains("\"created_at\":\"t1\""));
    assert!(first.contains("\"treasury_info\""));

    // The ping control token elicits a pong through the same queue.
    ws.send(Message::Text("ping".to_string())).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap().into_text().unwrap();
    assert_eq!(reply, r#"{"pong":true}"#);

    // An accepted mutation published through the hub reaches the wire.
    assert!(store.apply_rate(rate(1_050_000, "t2")));
    hub.publish(store.snapshot_json());
    let update = ws.next().await.unwrap().unwrap().into_text().unwrap();
    assert!(update.contains("\"created_at\":\"t2\""));
    assert!(update.contains("🚀"));
}

#[tokio::test]
async fn test_over_capacity_connection_is_told_and_closed() {
    let store = Arc::new(StateStore::new());
    let hub = Arc::new(Hub::new(
        store.clone(),
        HubConfig {
            max_subscribers: 1,
            ..HubConfig::default()
        },
    ));
    let addr = spawn_server(store, hub.clone()).await;

    let (mut first, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    // Drain the initial snapshot so the first subscriber is healthy.
    first.next().await.unwrap().unwrap();

    let (mut second, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    match second.next().await.unwrap().unwrap() {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Again);
            assert!(frame.reason.contains("Too many connections"));
        }
        other => panic!("expected close frame, got {other:?}"),
    }

    // The registered subscriber is unaffected.
    assert_eq!(hub.subscriber_count(), 1);
}

#[tokio::test]
async fn test_api_state_returns_current_snapshot() {
    let store = Arc::new(StateStore::new());
    assert!(store.apply_rate(rate(1_000_000, "t1")));
    store.set_info_text("cek dulu");
    let hub = Arc::new(Hub::new(store.clone(), HubConfig::default()));
    let addr = spawn_server(store, hub).await;

    let resp = reqwest::get(format!("http://{addr}/api/state")).await.unwrap();
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body = resp.text().await.unwrap();
    assert!(body.contains("\"created_at\":\"t1\""));
    assert!(body.contains("\"treasury_info\":\"cek dulu\""));
}
