//! Error types for notemend-polish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
///
/// Only two failure classes ever reach the caller: invalid input (400) and
/// missing service credential (500). Model-side failures are absorbed by the
/// polishing pipeline and degrade to a 200 with the original note.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Service misconfiguration (500), e.g. missing completion credential
    #[error("{0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        // Flat body shape; the upstream clinical app expects { "error": "..." }
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
