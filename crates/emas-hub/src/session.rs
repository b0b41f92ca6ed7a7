//! Per-connection session bridging the hub to the wire.
//!
//! Each connection runs two cooperating tasks: an outbound drain (queue →
//! socket) and an inbound read loop (socket → control handling). A shared
//! cancellation token ties them together so a failure on either side tears
//! down both, after which the subscriber is unregistered.

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use emas_telemetry::Metrics;

use crate::hub::{Hub, Registration, PONG_MESSAGE};

/// Control token a subscriber sends to request a liveness acknowledgment.
const PING_TOKEN: &str = "ping";

/// Run one subscriber session to completion.
pub(crate) async fn handle_socket(mut socket: WebSocket, hub: Arc<Hub>) {
    let Registration { id, mut rx, tx } = match hub.register() {
        Ok(reg) => reg,
        Err(e) => {
            // Over capacity: tell the peer why, then disconnect. Existing
            // subscribers are unaffected.
            warn!(error = %e, "rejecting subscriber");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();
    let closed = CancellationToken::new();

    // Outbound drain: the only reader of this subscriber's queue. Blocks
    // solely on message availability; publishers never block on it.
    let drain_closed = closed.clone();
    let outbound = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = drain_closed.cancelled() => break,
                maybe = rx.recv() => match maybe {
                    Some(payload) => {
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            debug!(id, "write failed, closing session");
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        drain_closed.cancel();
    });

    // Inbound read loop: control protocol only. Wire messages never mutate
    // the state document from here.
    loop {
        tokio::select! {
            _ = closed.cancelled() => break,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if text.as_str() == PING_TOKEN
                        && tx.try_send(PONG_MESSAGE.to_string()).is_err()
                    {
                        Metrics::message_dropped("pong");
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(id, "peer closed");
                    break;
                }
                Some(Err(e)) => {
                    debug!(id, error = %e, "read failed, closing session");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    closed.cancel();
    let _ = outbound.await;
    hub.unregister(id);
}
