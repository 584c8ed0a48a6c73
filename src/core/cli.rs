//! Command-line arguments, each with an environment variable fallback

use clap::Parser;

use super::constants::{
    APP_NAME_LOWER, ENV_DEBUG, ENV_HEARTBEAT_INTERVAL_MS, ENV_HOST, ENV_LOG, ENV_PORT,
    ENV_RING_BUFFER_SIZE, ENV_SUBSCRIBER_QUEUE_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = APP_NAME_LOWER)]
#[command(version, about = "In-memory publish/subscribe broker", long_about = None)]
pub struct Cli {
    /// Listen host
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Per-topic replay ring capacity
    #[arg(long, env = ENV_RING_BUFFER_SIZE)]
    pub ring_buffer_size: Option<usize>,

    /// Per-subscriber bounded outbound queue capacity
    #[arg(long, env = ENV_SUBSCRIBER_QUEUE_SIZE)]
    pub subscriber_queue_size: Option<usize>,

    /// Heartbeat broadcast cadence, in milliseconds
    #[arg(long, env = ENV_HEARTBEAT_INTERVAL_MS)]
    pub heartbeat_interval_ms: Option<u64>,

    /// Tracing filter (e.g. "info", "debug", "relaybus=trace")
    #[arg(long, env = ENV_LOG)]
    pub log: Option<String>,

    /// Enable debug mode (verbose default log filter)
    #[arg(long, env = ENV_DEBUG)]
    pub debug: bool,
}

/// Parse `std::env::args`, clap's `env` fallbacks having already consulted
/// the process environment before this returns.
pub fn parse() -> Cli {
    Cli::parse()
}
