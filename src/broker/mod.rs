//! The broker: topic registry, envelope taxonomy, and delivery primitives.
//!
//! `registry` holds the actual state machine (component D of the design);
//! the other submodules are the value types it is built from.

pub mod envelope;
pub mod error;
pub mod heartbeat;
pub mod queue;
pub mod registry;
pub mod ring;
pub mod session;
pub mod stats;

pub use envelope::{ErrorCode, ErrorDetail, InboundEnvelope, MessageBody, OutboundEnvelope};
pub use error::BrokerError;
pub use registry::{Broker, BrokerConfig, ConnId, SessionCommand};
