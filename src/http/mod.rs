//! HTTP surface (component K): topic admission, observability endpoints,
//! and the `/ws` bidirectional session endpoint, wrapped in a middleware
//! stack (tracing, compression, CORS, a body limit, a 404 fallback).

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::broker::Broker;
use crate::core::constants::MAX_BODY_BYTES;
use crate::core::shutdown::ShutdownService;

pub use error::ApiError;

/// Build the full router for a given broker instance.
pub fn router(broker: Arc<Broker>) -> Router {
    Router::new()
        .route("/topics", post(routes::create_topic).get(routes::list_topics))
        .route("/topics/{name}", delete(routes::delete_topic))
        .route("/health", get(routes::health))
        .route("/stats", get(routes::stats))
        .route("/ws", get(ws::handler))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(broker)
}

/// Bind `addr` and serve until `shutdown` fires, then return.
pub async fn serve(addr: SocketAddr, broker: Arc<Broker>, shutdown: ShutdownService) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(broker)).with_graceful_shutdown(shutdown.wait()).await?;
    Ok(())
}
