//! Handlers for the `/items` resource.
//!
//! Thin adapters over [`ItemService`](crate::service::ItemService): decode the
//! request, delegate, map the outcome to a status code.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use itemgrid_core::types::DbId;
use itemgrid_db::models::item::{CreateItem, SearchItems};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /api/v1/items/search
///
/// Filtered, sorted, paged search. Responds with `{ items, totalCount }`.
pub async fn search(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SearchItems>,
) -> AppResult<impl IntoResponse> {
    let page = state.items.search(&input).await?;
    Ok(Json(page))
}

/// GET /api/v1/items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = state.items.get(id).await?;
    Ok(Json(item))
}

/// POST /api/v1/items
///
/// Create an item. Responds 200 with the created item.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateItem>,
) -> AppResult<impl IntoResponse> {
    let item = state.items.create(input.serial_number()).await?;
    Ok(Json(item))
}

/// DELETE /api/v1/items/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
