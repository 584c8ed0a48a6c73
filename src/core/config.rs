//! Layered configuration: compiled-in defaults, overridden by environment
//! variables, overridden by CLI flags. There is exactly one process role
//! and a handful of knobs here, so no config-file layer is warranted; see
//! DESIGN.md for that call.

use super::cli::Cli;
use super::constants::{
    DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT,
    DEFAULT_RING_BUFFER_SIZE, DEFAULT_SUBSCRIBER_QUEUE_SIZE,
};
use crate::broker::BrokerConfig as CoreBrokerConfig;

/// Listen address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Heartbeat cadence.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    pub interval_ms: u64,
}

/// Tracing filter string, consulted by `init_logging` at startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub filter: String,
}

/// The final, merged configuration used at runtime.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub broker: CoreBrokerConfig,
    pub heartbeat: HeartbeatConfig,
    pub log: LogConfig,
    pub debug: bool,
}

impl RelayConfig {
    /// Merge compiled-in defaults with parsed CLI flags (which themselves
    /// already fell back to environment variables via `clap`'s `env = ...`).
    pub fn from_cli(cli: &Cli) -> Self {
        let debug = cli.debug;
        let filter = cli.log.clone().unwrap_or_else(|| {
            if debug {
                format!("debug,{}", DEFAULT_LOG_FILTER)
            } else {
                DEFAULT_LOG_FILTER.to_string()
            }
        });

        Self {
            server: ServerConfig {
                host: cli.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: cli.port.unwrap_or(DEFAULT_PORT),
            },
            broker: CoreBrokerConfig {
                ring_buffer_size: cli.ring_buffer_size.unwrap_or(DEFAULT_RING_BUFFER_SIZE),
                subscriber_queue_size: cli.subscriber_queue_size.unwrap_or(DEFAULT_SUBSCRIBER_QUEUE_SIZE),
            },
            heartbeat: HeartbeatConfig {
                interval_ms: cli.heartbeat_interval_ms.unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS),
            },
            log: LogConfig { filter },
            debug,
        }
    }
}

/// `true` when `host` binds every interface, used by the startup banner to
/// decide whether to enumerate LAN addresses.
pub fn is_all_interfaces(host: &str) -> bool {
    host == "0.0.0.0" || host == "::"
}
