//! RelayBus: an in-memory publish/subscribe broker.
//!
//! `broker` holds the core (topic registry, replay ring, bounded outbound
//! queues, the session adapter); `http` exposes it over the admission/
//! observability HTTP surface and the `/ws` bidirectional session endpoint;
//! `core` is the ambient stack (config, CLI, shutdown, constants) shared by
//! both.

pub mod app;
pub mod broker;
pub mod core;
pub mod http;

pub use app::App;
