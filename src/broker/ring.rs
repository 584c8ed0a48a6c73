//! Fixed-capacity per-topic replay ring

use std::collections::VecDeque;

use super::envelope::MessageBody;

/// Holds the most recent `capacity` payload envelopes published to a topic,
/// in insertion order. Capacity is fixed at construction; `capacity == 0`
/// disables retention entirely.
#[derive(Debug)]
pub struct ReplayRing {
    capacity: usize,
    items: VecDeque<MessageBody>,
}

impl ReplayRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Append `message`, overwriting the oldest entry once at capacity.
    /// A no-op when `capacity == 0`.
    pub fn append(&mut self, message: MessageBody) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(message);
    }

    /// The most recent `min(n, size)` messages, oldest first. Does not mutate.
    pub fn last(&self, n: usize) -> Vec<MessageBody> {
        let n = n.min(self.items.len());
        self.items.iter().skip(self.items.len() - n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
