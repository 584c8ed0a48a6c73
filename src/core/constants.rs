// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and logging)
pub const APP_NAME: &str = "RelayBus";

/// Application name in lowercase (for identifiers)
pub const APP_NAME_LOWER: &str = "relaybus";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "RELAYBUS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "RELAYBUS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RELAYBUS_LOG";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "RELAYBUS_DEBUG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 4000;

/// Default tracing filter, applied when `RUST_LOG`/`ENV_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,relaybus=debug";

// =============================================================================
// Environment Variables - Broker
// =============================================================================

/// Environment variable overriding the per-topic replay ring capacity
pub const ENV_RING_BUFFER_SIZE: &str = "RELAYBUS_RING_BUFFER_SIZE";

/// Environment variable overriding the per-subscriber outbound queue capacity
pub const ENV_SUBSCRIBER_QUEUE_SIZE: &str = "RELAYBUS_SUBSCRIBER_QUEUE_SIZE";

/// Environment variable overriding the heartbeat cadence in milliseconds
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "RELAYBUS_HEARTBEAT_INTERVAL_MS";

// =============================================================================
// Broker Defaults
// =============================================================================

/// Default per-topic replay ring capacity (`R` in the design)
pub const DEFAULT_RING_BUFFER_SIZE: usize = 100;

/// Default per-subscriber bounded outbound queue capacity (`Q` in the design)
pub const DEFAULT_SUBSCRIBER_QUEUE_SIZE: usize = 512;

/// Default heartbeat cadence
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Number of queued deliveries drained to the transport per fan-out step
pub const FANOUT_DRAIN_BATCH: usize = 100;

/// Capacity of the bounded hand-off channel from the broker to a
/// connection's writer task. Deliberately small relative to
/// `DEFAULT_SUBSCRIBER_QUEUE_SIZE`: this is what makes the per-subscriber
/// outbound queue (component A) the real buffer under load — once this
/// channel saturates, fan-out stops draining the subscriber's queue and
/// the queue itself starts absorbing backpressure, evicting its oldest
/// entry per the drop-oldest policy.
pub const SESSION_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Topic naming
// =============================================================================

/// Source pattern for valid topic names
pub const TOPIC_NAME_PATTERN: &str = r"^[A-Za-z0-9._-]{1,200}$";

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for in-flight work to drain before exiting
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// HTTP
// =============================================================================

/// Maximum accepted request body size, in bytes
pub const MAX_BODY_BYTES: usize = 1024 * 1024;
