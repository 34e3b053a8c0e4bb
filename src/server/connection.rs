//! Per-channel WebSocket task
//!
//! Bridges one socket to the hub: inbound text frames become hub events, and
//! the channel's outbox is drained into the socket by a writer half.

use std::net::SocketAddr;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures::{SinkExt, StreamExt};

use crate::engine::HubHandle;
use crate::protocol::ClientMessage;
use crate::registry::ConnectionId;
use crate::session::Outbox;

/// Drive one channel until its transport closes
pub(crate) async fn handle_socket(
    socket: WebSocket,
    id: ConnectionId,
    peer_addr: SocketAddr,
    hub: HubHandle,
    outbox_capacity: usize,
) {
    let (outbox, mut outbound_rx) = Outbox::channel(outbox_capacity);

    if let Err(e) = hub.connect(id, outbox).await {
        tracing::warn!(connection_id = %id, error = %e, "Hub unavailable, dropping channel");
        return;
    }

    tracing::debug!(connection_id = %id, peer = %peer_addr, "WebSocket channel open");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let writer = async move {
        while let Some(outbound) = outbound_rx.recv().await {
            for frame in outbound.into_frames() {
                let text = match Utf8Bytes::try_from(frame.into_bytes()) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(connection_id = %id, error = %e, "Outbound frame is not UTF-8");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
        }
        // Outbox dropped by the engine
        let _ = ws_sender.close().await;
    };

    let reader = async {
        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Text(text)) => match ClientMessage::from_json(text.as_str()) {
                    Ok(ClientMessage::Location(report)) => {
                        if hub.report(id, report).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %id,
                            error = %e,
                            "Malformed message ignored"
                        );
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %id, "Binary frame ignored");
                }
                Ok(Message::Close(_)) => break,
                // Ping/pong are answered by the WebSocket layer
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "WebSocket read error");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = writer => {
            tracing::debug!(connection_id = %id, "WebSocket write side closed");
        }
        _ = reader => {}
    }

    if hub.disconnect(id).await.is_err() {
        tracing::debug!(connection_id = %id, "Hub stopped before disconnect");
    }

    tracing::debug!(connection_id = %id, peer = %peer_addr, "WebSocket channel closed");
}
