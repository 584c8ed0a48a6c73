//! Admission and observability routes (component K).

use std::sync::{Arc, LazyLock};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::broker::{Broker, BrokerError};
use crate::core::constants::TOPIC_NAME_PATTERN;

use super::error::ApiError;
use super::extract::ApiJson;

static TOPIC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOPIC_NAME_PATTERN).expect("TOPIC_NAME_PATTERN is a valid regex"));

fn validate_topic_name(name: &str) -> Result<(), ApiError> {
    if TOPIC_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("invalid topic name: {name:?}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub name: String,
}

/// `POST /topics`
pub async fn create_topic(State(broker): State<Arc<Broker>>, ApiJson(req): ApiJson<CreateTopicRequest>) -> Response {
    if let Err(err) = validate_topic_name(&req.name) {
        return err.into_response();
    }

    match broker.create_topic(&req.name) {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "status": "created", "topic": req.name }))).into_response(),
        Err(BrokerError::TopicExists(name)) => {
            (StatusCode::CONFLICT, Json(json!({ "status": "conflict", "topic": name }))).into_response()
        }
        Err(err) => ApiError::internal(err.to_string()).into_response(),
    }
}

/// `DELETE /topics/{name}`
pub async fn delete_topic(State(broker): State<Arc<Broker>>, Path(name): Path<String>) -> Response {
    if let Err(err) = validate_topic_name(&name) {
        return err.into_response();
    }

    match broker.delete_topic(&name) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "deleted", "topic": name }))).into_response(),
        Err(BrokerError::TopicNotFound(name)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "status": "not_found", "topic": name }))).into_response()
        }
        Err(err) => ApiError::internal(err.to_string()).into_response(),
    }
}

/// `GET /topics`
pub async fn list_topics(State(broker): State<Arc<Broker>>) -> impl IntoResponse {
    Json(json!({ "topics": broker.topic_list() }))
}

/// `GET /health`
pub async fn health(State(broker): State<Arc<Broker>>) -> impl IntoResponse {
    Json(broker.health_snapshot())
}

/// `GET /stats`
pub async fn stats(State(broker): State<Arc<Broker>>) -> impl IntoResponse {
    Json(broker.topic_stats())
}
