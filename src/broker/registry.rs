//! Broker registry (component D): topic lifecycle, subscriber membership,
//! and the fan-out delivery pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::envelope::{MessageBody, OutboundEnvelope};
use super::error::BrokerError;
use super::queue::{BoundedQueue, Delivery};
use super::ring::ReplayRing;
use super::stats::{HealthSnapshot, StatsSnapshot, TopicStatsSnapshot, TopicSummary};
use crate::core::constants::{
    DEFAULT_RING_BUFFER_SIZE, DEFAULT_SUBSCRIBER_QUEUE_SIZE, FANOUT_DRAIN_BATCH, SESSION_CHANNEL_CAPACITY,
};

/// Identifies one live connection. Assigned by the broker when the
/// transport registers a new session; never reused while that session
/// is live.
pub type ConnId = u64;

/// Per-topic, per-subscriber-queue capacity knobs.
#[derive(Debug, Clone, Copy)]
pub struct BrokerConfig {
    pub ring_buffer_size: usize,
    pub subscriber_queue_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ring_buffer_size: DEFAULT_RING_BUFFER_SIZE,
            subscriber_queue_size: DEFAULT_SUBSCRIBER_QUEUE_SIZE,
        }
    }
}

/// Instruction sent down a session's outbound channel.
#[derive(Debug)]
pub enum SessionCommand {
    Send(Box<OutboundEnvelope>),
    Close,
}

/// Non-owning handle to a live connection: an outbound channel plus the
/// ability to force a disconnect. The broker owns this handle; the
/// transport owns the actual socket, avoiding a subscriber/connection
/// reference cycle.
///
/// The channel itself is bounded (`SESSION_CHANNEL_CAPACITY`), standing in
/// for the connection's real transport buffer: it is the thing that can
/// actually apply back-pressure to fan-out. When it is saturated — the
/// writer task isn't keeping up — hand-offs fail and the event stays in
/// the per-subscriber bounded queue (component A), which is where
/// drop-oldest eviction is meant to happen, rather than the fan-out loop
/// silently absorbing unlimited backlog on the writer's behalf.
#[derive(Clone)]
pub struct ConnectionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { tx }
    }

    /// Best-effort, non-blocking hand-off for a single control envelope
    /// (ack/pong/heartbeat/deletion notice/event). Never retried on failure
    /// (spec §9, "best-effort transport writes"); failure means either the
    /// session has gone away or its channel is currently saturated, and
    /// both are silently ignored by callers that don't need the item to
    /// survive a failed hand-off. Callers delivering a queued item (fan-out)
    /// instead check this result themselves so they can leave the item
    /// queued rather than lose it.
    fn try_send(&self, envelope: OutboundEnvelope) -> Result<(), ()> {
        self.tx.try_send(SessionCommand::Send(Box::new(envelope))).map_err(|_| ())
    }

    fn close(&self) {
        let _ = self.tx.try_send(SessionCommand::Close);
    }
}

struct SubscriberRecord {
    client_id: String,
    queue: BoundedQueue,
}

struct TopicRecord {
    subscribers: HashMap<ConnId, SubscriberRecord>,
    ring: ReplayRing,
    messages: u64,
    delivered: u64,
    dropped: u64,
}

impl TopicRecord {
    fn new(ring_capacity: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            ring: ReplayRing::new(ring_capacity),
            messages: 0,
            delivered: 0,
            dropped: 0,
        }
    }

    fn stats(&self) -> TopicStatsSnapshot {
        TopicStatsSnapshot {
            messages: self.messages,
            subscribers: self.subscribers.len(),
            delivered: self.delivered,
            dropped: self.dropped,
        }
    }
}

/// The single in-memory topic registry (component D). Sole owner of every
/// topic record; topic records own their subscriber table and replay ring.
pub struct Broker {
    config: BrokerConfig,
    topics: RwLock<HashMap<String, TopicRecord>>,
    connections: RwLock<HashMap<ConnId, ConnectionHandle>>,
    next_conn_id: AtomicU64,
    started_at: Instant,
}

impl Broker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            topics: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> BrokerConfig {
        self.config
    }

    /// Allocate a fresh connection identifier for a new transport session.
    pub fn next_connection_id(&self) -> ConnId {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn register_connection(&self, conn_id: ConnId, tx: mpsc::Sender<SessionCommand>) {
        self.connections.write().insert(conn_id, ConnectionHandle::new(tx));
    }

    // ---- admission (component D, createTopic/deleteTopic) ----

    pub fn create_topic(&self, name: &str) -> Result<(), BrokerError> {
        let mut topics = self.topics.write();
        if topics.contains_key(name) {
            return Err(BrokerError::TopicExists(name.to_string()));
        }
        topics.insert(name.to_string(), TopicRecord::new(self.config.ring_buffer_size));
        tracing::debug!(topic = name, "topic created");
        Ok(())
    }

    /// Atomic from the broker's viewpoint: look up, remove from the
    /// registry (new operations immediately see it as absent), then notify
    /// and force-close every captured subscriber's connection.
    pub fn delete_topic(&self, name: &str) -> Result<(), BrokerError> {
        let record = {
            let mut topics = self.topics.write();
            topics.remove(name).ok_or_else(|| BrokerError::TopicNotFound(name.to_string()))?
        };

        let now = Utc::now();
        let connections = self.connections.read();
        for conn_id in record.subscribers.keys() {
            if let Some(handle) = connections.get(conn_id) {
                let _ = handle.try_send(OutboundEnvelope::info("topic_deleted", Some(name.to_string()), now));
                handle.close();
            }
        }
        tracing::debug!(topic = name, subscribers = record.subscribers.len(), "topic deleted");
        Ok(())
    }

    // ---- subscription lifecycle ----

    pub fn subscribe(
        &self,
        conn_id: ConnId,
        topic: &str,
        client_id: String,
        last_n: u64,
        request_id: Option<String>,
    ) -> Result<(), BrokerError> {
        let now = Utc::now();
        let replay = {
            let mut topics = self.topics.write();
            let record = topics.get_mut(topic).ok_or_else(|| BrokerError::TopicNotFound(topic.to_string()))?;

            tracing::debug!(topic, client_id = %client_id, "subscriber registered");
            record.subscribers.insert(
                conn_id,
                SubscriberRecord {
                    client_id,
                    queue: BoundedQueue::new(self.config.subscriber_queue_size),
                },
            );

            // last_n == 0 never triggers replay.
            if last_n > 0 { record.ring.last(last_n as usize) } else { Vec::new() }
        };

        {
            let connections = self.connections.read();
            if let Some(handle) = connections.get(&conn_id) {
                let _ = handle.try_send(OutboundEnvelope::ack(topic, request_id, now));
            }
        }

        // Replay goes through the normal enqueue+drain path, so overflow is
        // accounted against the ring replay itself.
        for message in replay {
            self.deliver_one(topic, conn_id, message, now);
        }

        Ok(())
    }

    /// Idempotent: repeat calls after removal still reply `ack`.
    pub fn unsubscribe(&self, conn_id: ConnId, topic: &str, request_id: Option<String>) -> Result<(), BrokerError> {
        let now = Utc::now();
        {
            let mut topics = self.topics.write();
            let record = topics.get_mut(topic).ok_or_else(|| BrokerError::TopicNotFound(topic.to_string()))?;
            if let Some(removed) = record.subscribers.remove(&conn_id) {
                tracing::debug!(topic, client_id = %removed.client_id, "subscriber removed");
            }
        }

        let connections = self.connections.read();
        if let Some(handle) = connections.get(&conn_id) {
            let _ = handle.try_send(OutboundEnvelope::ack(topic, request_id, now));
        }
        Ok(())
    }

    // ---- publish / fan-out ----

    pub fn publish(&self, topic: &str, message: MessageBody) -> Result<DateTime<Utc>, BrokerError> {
        let now = Utc::now();
        let mut topics = self.topics.write();
        let record = topics.get_mut(topic).ok_or_else(|| BrokerError::TopicNotFound(topic.to_string()))?;

        record.messages += 1;
        record.ring.append(message.clone());

        let conn_ids: Vec<ConnId> = record.subscribers.keys().copied().collect();

        let mut dropped_this_publish = 0u64;
        for conn_id in &conn_ids {
            let Some(sub) = record.subscribers.get_mut(conn_id) else { continue };
            let delivery = Delivery { topic: topic.to_string(), id: message.id.clone(), payload: message.payload.clone() };
            if sub.queue.push(delivery) {
                dropped_this_publish += 1;
            }
        }
        record.dropped += dropped_this_publish;

        let connections = self.connections.read();
        let mut delivered_this_publish = 0u64;
        for conn_id in conn_ids {
            let Some(sub) = record.subscribers.get_mut(&conn_id) else { continue };
            let Some(handle) = connections.get(&conn_id) else { continue };
            delivered_this_publish += drain_to_transport(sub, handle, now);
        }
        record.delivered += delivered_this_publish;

        Ok(now)
    }

    /// Deliver a single replayed message to exactly one subscriber, through
    /// the normal enqueue+drain path (used by `subscribe`'s `last_n`).
    fn deliver_one(&self, topic: &str, conn_id: ConnId, message: MessageBody, now: DateTime<Utc>) {
        let mut topics = self.topics.write();
        let Some(record) = topics.get_mut(topic) else { return };
        let Some(sub) = record.subscribers.get_mut(&conn_id) else { return };

        let delivery = Delivery { topic: topic.to_string(), id: message.id.clone(), payload: message.payload.clone() };
        if sub.queue.push(delivery) {
            record.dropped += 1;
        }

        let connections = self.connections.read();
        let Some(handle) = connections.get(&conn_id) else { return };
        record.delivered += drain_to_transport(sub, handle, now);
    }

    pub fn ping(&self, conn_id: ConnId, request_id: Option<String>) {
        let connections = self.connections.read();
        if let Some(handle) = connections.get(&conn_id) {
            let _ = handle.try_send(OutboundEnvelope::pong(request_id, Utc::now()));
        }
    }

    /// Emit the `ack` for a successful publish. Unlike `subscribe`/
    /// `unsubscribe`, `publish` itself only returns the timestamp — the
    /// session layer acks using it once fan-out has been kicked off.
    pub fn ack_publish(&self, conn_id: ConnId, topic: &str, request_id: Option<String>, ts: DateTime<Utc>) {
        let connections = self.connections.read();
        if let Some(handle) = connections.get(&conn_id) {
            let _ = handle.try_send(OutboundEnvelope::ack(topic, request_id, ts));
        }
    }

    /// Emit an `error` envelope to a single connection. Used by the session
    /// layer for routing/fault failures the registry itself never produces
    /// (unknown envelope `type`, an internal panic caught mid-dispatch).
    pub fn send_error(&self, conn_id: ConnId, code: super::envelope::ErrorCode, message: impl Into<String>, request_id: Option<String>) {
        let connections = self.connections.read();
        if let Some(handle) = connections.get(&conn_id) {
            let _ = handle.try_send(OutboundEnvelope::error(code, message, request_id, Utc::now()));
        }
    }

    // ---- disconnect / shutdown ----

    /// Remove the connection from every topic's subscriber table it
    /// appears in. No notice is sent.
    pub fn handle_disconnect(&self, conn_id: ConnId) {
        let mut topics = self.topics.write();
        for record in topics.values_mut() {
            record.subscribers.remove(&conn_id);
        }
        drop(topics);
        self.connections.write().remove(&conn_id);
    }

    pub fn broadcast_heartbeat(&self) {
        let now = Utc::now();
        let connections = self.connections.read();
        for handle in connections.values() {
            let _ = handle.try_send(OutboundEnvelope::info("ping", None, now));
        }
    }

    pub fn close_all_connections(&self) {
        let connections = self.connections.read();
        for handle in connections.values() {
            handle.close();
        }
    }

    // ---- observability (component G) ----

    pub fn health_snapshot(&self) -> HealthSnapshot {
        let topics = self.topics.read();
        HealthSnapshot {
            uptime_sec: self.started_at.elapsed().as_secs(),
            topics: topics.len(),
            subscribers: topics.values().map(|t| t.subscribers.len()).sum(),
        }
    }

    pub fn topic_list(&self) -> Vec<TopicSummary> {
        let topics = self.topics.read();
        topics
            .iter()
            .map(|(name, record)| TopicSummary { name: name.clone(), subscribers: record.subscribers.len() })
            .collect()
    }

    pub fn topic_stats(&self) -> StatsSnapshot {
        let topics = self.topics.read();
        StatsSnapshot {
            topics: topics.iter().map(|(name, record)| (name.clone(), record.stats())).collect(),
        }
    }
}

/// Attempt to hand off up to `FANOUT_DRAIN_BATCH` items from `sub`'s queue
/// to `handle`'s bounded channel, oldest first. An item is only removed
/// from the queue once its hand-off actually succeeds; the first failed
/// hand-off (the channel is saturated or the session is gone) stops the
/// batch immediately and leaves that item — and everything behind it —
/// queued for the next publish to retry. This is what lets the bounded
/// queue (component A) actually hold a backlog and apply drop-oldest
/// under load, instead of always being emptied back to zero inline.
/// Returns the number of envelopes actually forwarded.
fn drain_to_transport(sub: &mut SubscriberRecord, handle: &ConnectionHandle, now: DateTime<Utc>) -> u64 {
    let mut forwarded = 0u64;
    for _ in 0..FANOUT_DRAIN_BATCH {
        let Some(delivery) = sub.queue.front() else { break };
        let envelope = OutboundEnvelope::event(
            delivery.topic.clone(),
            MessageBody { id: delivery.id.clone(), payload: delivery.payload.clone() },
            now,
        );
        if handle.try_send(envelope).is_err() {
            break;
        }
        sub.queue.pop_front();
        forwarded += 1;
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connect(broker: &Broker) -> (ConnId, mpsc::Receiver<SessionCommand>) {
        connect_with_capacity(broker, SESSION_CHANNEL_CAPACITY)
    }

    fn connect_with_capacity(broker: &Broker, capacity: usize) -> (ConnId, mpsc::Receiver<SessionCommand>) {
        let conn_id = broker.next_connection_id();
        let (tx, rx) = mpsc::channel(capacity);
        broker.register_connection(conn_id, tx);
        (conn_id, rx)
    }

    fn drain_events(rx: &mut mpsc::Receiver<SessionCommand>) -> Vec<OutboundEnvelope> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            if let SessionCommand::Send(envelope) = cmd {
                out.push(*envelope);
            }
        }
        out
    }

    fn msg(id: &str, n: u64) -> MessageBody {
        MessageBody { id: id.into(), payload: json!({ "seq": n }) }
    }

    // S1 — fan-out: two subscribers of one topic both see every publish, in order.
    #[test]
    fn fan_out_delivers_in_order_to_every_subscriber() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("e2e").unwrap();
        let (a, mut rx_a) = connect(&broker);
        let (b, mut rx_b) = connect(&broker);
        broker.subscribe(a, "e2e", "A".into(), 0, None).unwrap();
        broker.subscribe(b, "e2e", "B".into(), 0, None).unwrap();
        drain_events(&mut rx_a);
        drain_events(&mut rx_b);

        for (i, id) in ["m0", "m1", "m2"].iter().enumerate() {
            broker.publish("e2e", msg(id, i as u64)).unwrap();
        }

        for rx in [&mut rx_a, &mut rx_b] {
            let events: Vec<_> = drain_events(rx)
                .into_iter()
                .filter(|e| matches!(e, OutboundEnvelope::Event { .. }))
                .collect();
            assert_eq!(events.len(), 3);
            let ids: Vec<_> = events
                .iter()
                .map(|e| match e {
                    OutboundEnvelope::Event { message, .. } => message.id.clone(),
                    _ => unreachable!(),
                })
                .collect();
            assert_eq!(ids, vec!["m0", "m1", "m2"]);
        }
    }

    // S2 — replay: a late joiner with last_n gets exactly the requested tail, in order.
    #[test]
    fn subscribe_with_last_n_replays_tail_in_order() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("e2e").unwrap();
        for (i, id) in ["m0", "m1", "m2"].iter().enumerate() {
            broker.publish("e2e", msg(id, i as u64)).unwrap();
        }

        let (c, mut rx_c) = connect(&broker);
        broker.subscribe(c, "e2e", "C".into(), 2, None).unwrap();

        let events: Vec<_> = drain_events(&mut rx_c);
        // ack first, then two replayed events
        assert!(matches!(events[0], OutboundEnvelope::Ack { .. }));
        let replayed: Vec<_> = events
            .into_iter()
            .filter_map(|e| match e {
                OutboundEnvelope::Event { message, .. } => Some(message.id),
                _ => None,
            })
            .collect();
        assert_eq!(replayed, vec!["m1", "m2"]);
    }

    #[test]
    fn zero_last_n_never_replays() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        broker.publish("t", msg("m0", 0)).unwrap();

        let (c, mut rx_c) = connect(&broker);
        broker.subscribe(c, "t", "C".into(), 0, None).unwrap();

        let events = drain_events(&mut rx_c);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OutboundEnvelope::Ack { .. }));
    }

    // S3 — isolation: publishes to one topic never reach a subscriber of another.
    #[test]
    fn topics_are_isolated() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("e2e").unwrap();
        broker.create_topic("e2e2").unwrap();
        let (i, mut rx_i) = connect(&broker);
        broker.subscribe(i, "e2e2", "I".into(), 0, None).unwrap();
        drain_events(&mut rx_i);

        broker.publish("e2e", msg("m0", 0)).unwrap();

        let events = drain_events(&mut rx_i);
        assert!(events.is_empty());
    }

    // S4 — missing topic: publish yields not-found and mutates nothing.
    #[test]
    fn publish_to_missing_topic_is_rejected_and_inert() {
        let broker = Broker::new(BrokerConfig::default());
        let err = broker.publish("missing", msg("m0", 0)).unwrap_err();
        assert_eq!(err, BrokerError::TopicNotFound("missing".into()));
    }

    // S5 — delete propagates an info envelope and closes the connection.
    #[test]
    fn delete_topic_notifies_and_closes_subscribers() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("e2e").unwrap();
        let (d, mut rx_d) = connect(&broker);
        broker.subscribe(d, "e2e", "D".into(), 0, None).unwrap();
        drain_events(&mut rx_d);

        broker.delete_topic("e2e").unwrap();

        let cmds: Vec<_> = {
            let mut out = Vec::new();
            while let Ok(cmd) = rx_d.try_recv() {
                out.push(cmd);
            }
            out
        };
        assert!(cmds.iter().any(|c| matches!(
            c,
            SessionCommand::Send(e) if matches!(**e, OutboundEnvelope::Info { msg: "topic_deleted", .. })
        )));
        assert!(cmds.iter().any(|c| matches!(c, SessionCommand::Close)));

        assert_eq!(broker.subscribe(d, "e2e", "D".into(), 0, None).unwrap_err(), BrokerError::TopicNotFound("e2e".into()));
    }

    // S6 — backpressure: a subscriber whose transport never drains eventually
    // forces drop-oldest in its bounded queue (component A), and every
    // publish is accounted for across delivered/still-queued/dropped.
    #[test]
    fn overflow_drops_oldest_and_accounts_in_stats() {
        let config = BrokerConfig { ring_buffer_size: 10, subscriber_queue_size: 512 };
        let broker = Broker::new(config);
        broker.create_topic("bp").unwrap();
        // rx_s is deliberately never polled until the end: this is what lets
        // the session channel itself saturate, so fan-out stops draining the
        // subscriber's queue and drop-oldest has something to actually do.
        let (s, mut rx_s) = connect(&broker);
        broker.subscribe(s, "bp", "S".into(), 0, None).unwrap();

        for i in 0..1200u64 {
            broker.publish("bp", msg(&format!("m{i}"), i)).unwrap();
        }

        let stats = broker.topic_stats();
        let bp = &stats.topics["bp"];
        assert_eq!(bp.messages, 1200);
        assert!(bp.dropped > 0);

        let still_queued = {
            let topics = broker.topics.read();
            topics["bp"].subscribers[&s].queue.len() as u64
        };

        let delivered = drain_events(&mut rx_s)
            .into_iter()
            .filter(|e| matches!(e, OutboundEnvelope::Event { .. }))
            .count() as u64;
        assert_eq!(delivered, bp.delivered);
        assert_eq!(bp.delivered + bp.dropped + still_queued, 1200);
    }

    #[test]
    fn subscribers_counter_matches_table_size() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (a, _rx_a) = connect(&broker);
        let (b, _rx_b) = connect(&broker);
        broker.subscribe(a, "t", "A".into(), 0, None).unwrap();
        broker.subscribe(b, "t", "B".into(), 0, None).unwrap();
        assert_eq!(broker.topic_stats().topics["t"].subscribers, 2);

        broker.unsubscribe(a, "t", None).unwrap();
        assert_eq!(broker.topic_stats().topics["t"].subscribers, 1);
    }

    #[test]
    fn unsubscribe_then_subscribe_round_trips_table() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (a, _rx) = connect(&broker);
        assert_eq!(broker.topic_stats().topics["t"].subscribers, 0);

        broker.subscribe(a, "t", "A".into(), 0, None).unwrap();
        broker.unsubscribe(a, "t", None).unwrap();
        assert_eq!(broker.topic_stats().topics["t"].subscribers, 0);
    }

    #[test]
    fn repeated_unsubscribe_is_idempotent() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (a, _rx) = connect(&broker);
        broker.subscribe(a, "t", "A".into(), 0, None).unwrap();

        assert!(broker.unsubscribe(a, "t", None).is_ok());
        assert!(broker.unsubscribe(a, "t", None).is_ok());
    }

    #[test]
    fn resubscribe_on_same_connection_replaces_silently() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (a, mut rx) = connect(&broker);
        broker.subscribe(a, "t", "A".into(), 0, None).unwrap();
        broker.subscribe(a, "t", "A-again".into(), 0, None).unwrap();
        assert_eq!(broker.topic_stats().topics["t"].subscribers, 1);
        let acks = drain_events(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, OutboundEnvelope::Ack { .. }))
            .count();
        assert_eq!(acks, 2);
    }

    #[test]
    fn publisher_only_receives_echo_if_already_subscribed() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        let (p, mut rx_p) = connect(&broker);

        broker.publish("t", msg("m0", 0)).unwrap();
        assert!(drain_events(&mut rx_p).is_empty());

        broker.subscribe(p, "t", "P".into(), 0, None).unwrap();
        drain_events(&mut rx_p);
        broker.publish("t", msg("m1", 1)).unwrap();
        let events = drain_events(&mut rx_p);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn handle_disconnect_removes_from_every_topic() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t1").unwrap();
        broker.create_topic("t2").unwrap();
        let (a, _rx) = connect(&broker);
        broker.subscribe(a, "t1", "A".into(), 0, None).unwrap();
        broker.subscribe(a, "t2", "A".into(), 0, None).unwrap();

        broker.handle_disconnect(a);

        assert_eq!(broker.topic_stats().topics["t1"].subscribers, 0);
        assert_eq!(broker.topic_stats().topics["t2"].subscribers, 0);
    }

    #[test]
    fn delete_then_operations_yield_not_found() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        broker.delete_topic("t").unwrap();

        assert!(broker.delete_topic("t").is_err());
        assert!(broker.unsubscribe(1, "t", None).is_err());
        assert!(broker.publish("t", msg("m0", 0)).is_err());
    }

    #[test]
    fn create_topic_rejects_duplicate_name() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t").unwrap();
        assert_eq!(broker.create_topic("t").unwrap_err(), BrokerError::TopicExists("t".into()));
    }

    #[test]
    fn health_and_topic_list_snapshots() {
        let broker = Broker::new(BrokerConfig::default());
        broker.create_topic("t1").unwrap();
        broker.create_topic("t2").unwrap();
        let (a, _rx) = connect(&broker);
        broker.subscribe(a, "t1", "A".into(), 0, None).unwrap();

        let health = broker.health_snapshot();
        assert_eq!(health.topics, 2);
        assert_eq!(health.subscribers, 1);

        let list = broker.topic_list();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn broadcast_heartbeat_reaches_every_connection() {
        let broker = Broker::new(BrokerConfig::default());
        let (_a, mut rx_a) = connect(&broker);
        let (_b, mut rx_b) = connect(&broker);

        broker.broadcast_heartbeat();

        for rx in [&mut rx_a, &mut rx_b] {
            let events = drain_events(rx);
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], OutboundEnvelope::Info { msg: "ping", .. }));
        }
    }
}
