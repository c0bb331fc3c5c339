//! Client configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the state stream, relative to the base URL.
pub const STREAM_PATH: &str = "ws";

/// Reconnect attempts after a failure before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed delay between reconnect attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Timeout for opening the stream (TCP + WebSocket handshake).
/// Prevents a connect from hanging indefinitely on SYN blackholes.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single REST command round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffered server events per subscriber before lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
