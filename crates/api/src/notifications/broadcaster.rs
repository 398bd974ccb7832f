//! Event-to-WebSocket fan-out.

use std::sync::Arc;

use axum::extract::ws::Message;
use itemgrid_events::ItemEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::ws::WsManager;

/// Forwards [`ItemEvent`]s from the bus to every WebSocket connection.
///
/// Runs decoupled from the request that produced the event; a failure here
/// never reaches the API caller.
pub struct EventBroadcaster {
    ws_manager: Arc<WsManager>,
}

impl EventBroadcaster {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the forwarding loop.
    ///
    /// Exits when `cancel` fires or the bus is dropped.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<ItemEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Event broadcaster cancelled");
                    break;
                }
                next = receiver.recv() => next,
            };

            match next {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Clients re-fetch on the next event they do receive.
                    tracing::warn!(skipped = n, "Event broadcaster lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event broadcaster shutting down");
                    break;
                }
            }
        }
    }

    /// Serialize one event and send it to all connections.
    async fn forward(&self, event: &ItemEvent) {
        let text = match event.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event = event.name(), "Failed to serialize event");
                return;
            }
        };

        let delivered = self.ws_manager.broadcast(Message::Text(text.into())).await;
        tracing::debug!(
            event = event.name(),
            item_id = event.item_id(),
            delivered,
            "Broadcast item event"
        );
    }
}
