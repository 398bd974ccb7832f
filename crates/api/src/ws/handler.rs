//! `GET /api/v1/ws`: the item change feed.
//!
//! Each client receives every `ItemAdded` / `ItemDeleted` event as a JSON
//! text frame, plus heartbeat pings. The feed is one-way; inbound data
//! frames are read only to notice the client leaving.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Upgrade to a WebSocket and subscribe the client to item events.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_feed(socket, state.ws_manager))
}

/// Run one client's feed until it disconnects or the server closes it.
async fn serve_feed(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let outbound = ws_manager.add(conn_id.clone()).await;
    tracing::info!(%conn_id, "Item feed subscriber connected");

    let (sink, stream) = socket.split();
    let pump = tokio::spawn(pump_events(conn_id.clone(), outbound, sink));

    wait_for_departure(&conn_id, stream).await;

    ws_manager.remove(&conn_id).await;
    pump.abort();
    tracing::info!(%conn_id, "Item feed subscriber disconnected");
}

/// Copy queued event frames to the socket. A `Close` queued by shutdown is
/// sent and then ends the pump.
async fn pump_events(
    conn_id: String,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = outbound.recv().await {
        let closing = matches!(frame, Message::Close(_));
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(%conn_id, error = %e, "Item feed write failed");
            return;
        }
        if closing {
            return;
        }
    }
}

/// Read from the client until it closes or errors.
async fn wait_for_departure(conn_id: &str, mut stream: SplitStream<WebSocket>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => return,
            Ok(Message::Pong(_)) => tracing::trace!(conn_id, "Heartbeat pong"),
            Ok(_) => tracing::trace!(conn_id, "Discarding client frame on item feed"),
            Err(e) => {
                tracing::debug!(conn_id, error = %e, "Item feed read failed");
                return;
            }
        }
    }
}
