//! Session adapter (component E): translates one connection's inbound
//! envelopes into broker calls. Pure with respect to the transport — it
//! only ever talks to the broker through [`Broker`]'s public operations,
//! which themselves emit the corresponding outbound envelopes.

use super::envelope::{ErrorCode, InboundEnvelope};
use super::registry::{Broker, ConnId};

/// Handle one inbound envelope already parsed off the wire for `conn_id`.
///
/// Deserialization failures (unknown `type`) are the caller's
/// responsibility to report as `BAD_REQUEST` — this function only ever
/// sees a well-formed [`InboundEnvelope`].
pub fn dispatch(broker: &Broker, conn_id: ConnId, envelope: InboundEnvelope) {
    match envelope {
        InboundEnvelope::Subscribe { topic, client_id, last_n, request_id } => {
            if let Err(err) = broker.subscribe(conn_id, &topic, client_id, last_n, request_id.clone()) {
                broker.send_error(conn_id, err.envelope_code(), err.to_string(), request_id);
            }
        }
        InboundEnvelope::Unsubscribe { topic, client_id, request_id } => {
            tracing::trace!(topic = %topic, client_id = %client_id, "unsubscribe requested");
            if let Err(err) = broker.unsubscribe(conn_id, &topic, request_id.clone()) {
                broker.send_error(conn_id, err.envelope_code(), err.to_string(), request_id);
            }
        }
        InboundEnvelope::Publish { topic, message, request_id } => match broker.publish(&topic, message) {
            Ok(ts) => {
                broker.ack_publish(conn_id, &topic, request_id, ts);
            }
            Err(err) => {
                broker.send_error(conn_id, err.envelope_code(), err.to_string(), request_id);
            }
        },
        InboundEnvelope::Ping { request_id } => {
            broker.ping(conn_id, request_id);
        }
    }
}

/// Report a malformed envelope (unknown `type`, or a shape serde could not
/// parse) as `BAD_REQUEST`. There is no `request_id` to echo: the envelope
/// never parsed far enough to extract one.
pub fn dispatch_malformed(broker: &Broker, conn_id: ConnId, reason: impl Into<String>) {
    broker.send_error(conn_id, ErrorCode::BadRequest, reason, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::registry::BrokerConfig;
    use crate::broker::registry::SessionCommand;
    use crate::core::constants::SESSION_CHANNEL_CAPACITY;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn new_connection(broker: &Broker) -> (ConnId, mpsc::Receiver<SessionCommand>) {
        let conn_id = broker.next_connection_id();
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        broker.register_connection(conn_id, tx);
        (conn_id, rx)
    }

    #[tokio::test]
    async fn subscribe_to_missing_topic_sends_error() {
        let broker = Broker::new(BrokerConfig::default());
        let (conn_id, mut rx) = new_connection(&broker);

        dispatch(
            &broker,
            conn_id,
            InboundEnvelope::Subscribe { topic: "missing".into(), client_id: "c1".into(), last_n: 0, request_id: None },
        );

        let SessionCommand::Send(envelope) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let value = serde_json::to_value(&*envelope).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["error"]["code"], "TOPIC_NOT_FOUND");
    }

    #[tokio::test]
    async fn publish_then_subscribe_roundtrip() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (conn_id, mut rx) = new_connection(&broker);

        dispatch(
            &broker,
            conn_id,
            InboundEnvelope::Subscribe { topic: "t".into(), client_id: "c1".into(), last_n: 0, request_id: Some("r1".into()) },
        );
        let SessionCommand::Send(ack) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let ack = serde_json::to_value(&*ack).unwrap();
        assert_eq!(ack["type"], "ack");
        assert_eq!(ack["request_id"], "r1");

        dispatch(
            &broker,
            conn_id,
            InboundEnvelope::Publish {
                topic: "t".into(),
                message: super::super::envelope::MessageBody { id: "m0".into(), payload: json!({"n": 1}) },
                request_id: Some("r2".into()),
            },
        );

        // Fan-out happens inside `publish` itself, before it returns the
        // timestamp the session layer then uses to ack — so the publisher's
        // own echo arrives before its publish ack.
        let SessionCommand::Send(event) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let event = serde_json::to_value(&*event).unwrap();
        assert_eq!(event["type"], "event");
        assert_eq!(event["message"]["id"], "m0");

        let SessionCommand::Send(publish_ack) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let publish_ack = serde_json::to_value(&*publish_ack).unwrap();
        assert_eq!(publish_ack["type"], "ack");
        assert_eq!(publish_ack["request_id"], "r2");
    }

    #[tokio::test]
    async fn ping_sends_pong_without_request_id() {
        let broker = Broker::new(BrokerConfig::default());
        let (conn_id, mut rx) = new_connection(&broker);

        dispatch(&broker, conn_id, InboundEnvelope::Ping { request_id: None });

        let SessionCommand::Send(pong) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let pong = serde_json::to_value(&*pong).unwrap();
        assert_eq!(pong["type"], "pong");
    }

    #[tokio::test]
    async fn unsubscribe_unknown_topic_reports_error() {
        let broker = Broker::new(BrokerConfig::default());
        let (conn_id, mut rx) = new_connection(&broker);

        dispatch(
            &broker,
            conn_id,
            InboundEnvelope::Unsubscribe { topic: "ghost".into(), client_id: "c1".into(), request_id: None },
        );

        let SessionCommand::Send(envelope) = rx.try_recv().unwrap() else { panic!("expected Send") };
        let value = serde_json::to_value(&*envelope).unwrap();
        assert_eq!(value["error"]["code"], "TOPIC_NOT_FOUND");
    }
}
