//! Wire envelope taxonomy for the `/ws` bidirectional protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A caller-supplied `{id, payload}` pair. `id` is opaque to the broker; no
/// uniqueness is enforced.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MessageBody {
    pub id: String,
    pub payload: Value,
}

/// Client-to-server envelope. The closed `type` discriminant rejects unknown
/// kinds at deserialization, which the session maps to `BAD_REQUEST`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEnvelope {
    Subscribe {
        topic: String,
        client_id: String,
        #[serde(default)]
        last_n: u64,
        #[serde(default)]
        request_id: Option<String>,
    },
    Unsubscribe {
        topic: String,
        client_id: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    Publish {
        topic: String,
        message: MessageBody,
        #[serde(default)]
        request_id: Option<String>,
    },
    Ping {
        #[serde(default)]
        request_id: Option<String>,
    },
}

/// The closed set of error codes the protocol can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    TopicNotFound,
    /// Reserved; this design never evicts with a user-visible signal beyond
    /// the `dropped` stats counter, so this code is never emitted.
    SlowConsumer,
    /// Reserved for future authn/authz; unused by this design.
    Unauthorized,
    Internal,
}

/// Server-to-client envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEnvelope {
    Ack {
        topic: String,
        status: &'static str,
        ts: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    Event {
        topic: String,
        message: MessageBody,
        ts: DateTime<Utc>,
    },
    Error {
        error: ErrorDetail,
        ts: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    Pong {
        ts: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    Info {
        msg: &'static str,
        ts: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

impl OutboundEnvelope {
    pub fn ack(topic: impl Into<String>, request_id: Option<String>, now: DateTime<Utc>) -> Self {
        OutboundEnvelope::Ack {
            topic: topic.into(),
            status: "ok",
            ts: now,
            request_id,
        }
    }

    pub fn event(topic: impl Into<String>, message: MessageBody, now: DateTime<Utc>) -> Self {
        OutboundEnvelope::Event {
            topic: topic.into(),
            message,
            ts: now,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, request_id: Option<String>, now: DateTime<Utc>) -> Self {
        OutboundEnvelope::Error {
            error: ErrorDetail { code, message: message.into() },
            ts: now,
            request_id,
        }
    }

    pub fn pong(request_id: Option<String>, now: DateTime<Utc>) -> Self {
        OutboundEnvelope::Pong { ts: now, request_id }
    }

    pub fn info(msg: &'static str, topic: Option<String>, now: DateTime<Utc>) -> Self {
        OutboundEnvelope::Info { msg, ts: now, topic }
    }
}
