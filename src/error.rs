//! HTTP error type shared by all route handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::UnknownNode;

/// Errors a handler can return.
///
/// Implements [`IntoResponse`] so handlers can use `?` and still produce a
/// JSON body of the form `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    UnknownNode(#[from] UnknownNode),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::UnknownNode(e) => (StatusCode::NOT_FOUND, "UNKNOWN_NODE", e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
