use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use itemgrid_core::error::CoreError;
use itemgrid_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`]:
///
/// - validation / bad request -> 400 `{"message": ...}`
/// - conflict -> 409 `{"message": ...}`
/// - not found -> 404, empty body
/// - internal / database -> 500, empty body (details are logged only)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `itemgrid_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler and service return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn with_message(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id, "Not found");
                    StatusCode::NOT_FOUND.into_response()
                }
                CoreError::Validation(msg) => with_message(StatusCode::BAD_REQUEST, msg),
                CoreError::Conflict(msg) => with_message(StatusCode::CONFLICT, msg),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },

            // --- Store errors ---
            AppError::Store(StoreError::ConstraintViolation(msg)) => {
                with_message(StatusCode::CONFLICT, msg)
            }
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => with_message(StatusCode::BAD_REQUEST, msg),
        }
    }
}
