//! Error type for broker operations

use thiserror::Error;

use super::envelope::ErrorCode;

/// Errors produced by [`crate::broker::Broker`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// A topic with this name already exists
    #[error("topic '{0}' already exists")]
    TopicExists(String),

    /// No topic with this name is registered
    #[error("topic '{0}' not found")]
    TopicNotFound(String),
}

impl BrokerError {
    /// The closed envelope error code this error maps to, per the wire protocol.
    /// The broker never validates topic names itself (the admission layer
    /// does), so `BAD_REQUEST` only arises here from a duplicate `createTopic`.
    pub fn envelope_code(&self) -> ErrorCode {
        match self {
            BrokerError::TopicExists(_) => ErrorCode::BadRequest,
            BrokerError::TopicNotFound(_) => ErrorCode::TopicNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_not_found_maps_to_matching_code() {
        assert_eq!(BrokerError::TopicNotFound("t".into()).envelope_code(), ErrorCode::TopicNotFound);
    }

    #[test]
    fn topic_exists_maps_to_bad_request() {
        assert_eq!(BrokerError::TopicExists("t".into()).envelope_code(), ErrorCode::BadRequest);
    }
}
