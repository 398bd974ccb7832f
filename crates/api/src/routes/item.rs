//! Route definitions for items.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::item;
use crate::state::AppState;

/// Routes mounted at `/items`.
///
/// ```text
/// POST   /          -> create
/// POST   /search    -> search
/// GET    /{id}      -> get_by_id
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(item::create))
        .route("/search", post(item::search))
        .route("/{id}", get(item::get_by_id).delete(item::delete))
}
