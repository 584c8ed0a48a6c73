//! HTTP error taxonomy (component L): maps admission failures to response
//! shapes. Topic-specific outcomes (conflict, not-found) carry the topic
//! name and are built directly by the route handlers instead of going
//! through this type, since their JSON shape isn't shared across routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "internal API error");
        Self::Internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message),
        };
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
