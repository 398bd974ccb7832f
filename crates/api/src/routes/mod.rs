pub mod health;
pub mod item;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                  WebSocket push channel (ItemAdded / ItemDeleted)
///
/// /items               create
/// /items/search        search
/// /items/{id}          get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/items", item::router())
}
