use std::sync::Arc;

use itemgrid_db::ItemStore;
use itemgrid_events::EventBus;

use crate::config::ServerConfig;
use crate::service::ItemService;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Change notifier shared with the item service.
    pub event_bus: Arc<EventBus>,
    /// Item business rules over the configured record store.
    pub items: ItemService,
}

impl AppState {
    /// Wire the item service to `store` and `event_bus`.
    pub fn new(
        store: Arc<dyn ItemStore>,
        config: Arc<ServerConfig>,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let items = ItemService::new(store, Arc::clone(&event_bus));
        Self {
            config,
            ws_manager,
            event_bus,
            items,
        }
    }
}
