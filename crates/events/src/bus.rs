//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the registry of observers for [`ItemEvent`]s. It is
//! created once at startup, shared via `Arc<EventBus>`, and handed to the
//! components that publish or observe. Delivery is fire-and-forget: an
//! observer that falls behind or disconnects misses events and is expected
//! to re-fetch.

use itemgrid_core::types::DbId;
use itemgrid_db::models::item::Item;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ItemEvent
// ---------------------------------------------------------------------------

/// A change to the set of active items.
///
/// Serialized as `{"type": "ItemAdded", "payload": {...}}` or
/// `{"type": "ItemDeleted", "payload": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ItemEvent {
    /// An item was created; carries the full item.
    ItemAdded(Item),
    /// An item was deleted; carries its id.
    ItemDeleted(DbId),
}

impl ItemEvent {
    /// Event name as seen by clients.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded(_) => "ItemAdded",
            Self::ItemDeleted(_) => "ItemDeleted",
        }
    }

    /// Id of the item the event concerns.
    pub fn item_id(&self) -> DbId {
        match self {
            Self::ItemAdded(item) => item.id,
            Self::ItemDeleted(id) => *id,
        }
    }

    /// JSON text frame sent over the push channel.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use itemgrid_events::bus::{EventBus, ItemEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ItemEvent::ItemDeleted(7));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ItemEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers the event was queued for. Zero
    /// subscribers is not an error.
    pub fn publish(&self, event: ItemEvent) -> usize {
        let name = event.name();
        let item_id = event.item_id();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(event = name, item_id, delivered, "Published item event");
        delivered
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.sender.subscribe()
    }

    /// Number of observers currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
