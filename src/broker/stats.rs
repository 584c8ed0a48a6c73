//! Observability snapshot views: health, topic list, per-topic stats.

use std::collections::HashMap;

use serde::Serialize;

/// `GET /health` response body
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub uptime_sec: u64,
    pub topics: usize,
    /// Sum of per-topic subscriber counts: a connection subscribed to `k`
    /// topics is counted `k` times — this is "subscriptions", not
    /// "distinct subscribers".
    pub subscribers: usize,
}

/// One entry of `GET /topics`
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub subscribers: usize,
}

/// One topic's entry under `GET /stats`
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TopicStatsSnapshot {
    pub messages: u64,
    pub subscribers: usize,
    pub delivered: u64,
    pub dropped: u64,
}

/// `GET /stats` response body
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub topics: HashMap<String, TopicStatsSnapshot>,
}
