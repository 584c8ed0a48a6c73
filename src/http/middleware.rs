//! HTTP middleware (CORS, 404 fallback). This surface has no auth layer,
//! so CORS is permissive rather than origin-scoped.

use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{Any, CorsLayer};

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn handle_404() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
