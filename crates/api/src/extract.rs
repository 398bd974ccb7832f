//! Request extractors with project-specific rejections.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection is an [`AppError::BadRequest`], so malformed
/// bodies get the same `{"message": ...}` shape as validation failures.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
