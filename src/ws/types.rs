//! WebSocket types and configuration

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Path of the admin event endpoint, appended to the base WebSocket URL
pub const ADMIN_WS_PATH: &str = "/ws/admin";

/// Query parameter carrying the admin secret during the handshake
pub const SECRET_KEY_PARAM: &str = "secretKey";

/// Envelope type used for subscription requests
pub const SUBSCRIBE_TYPE: &str = "subscribe";

/// Fixed-interval reconnection policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reconnect automatically after the connection is lost
    pub enabled: bool,
    /// Delay before each reconnection attempt
    pub interval: Duration,
    /// Maximum reconnection attempts before giving up (0 = infinite)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Policy that never reconnects
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Whether `attempts` already made use up the allowance
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }
}

/// Event client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Base WebSocket URL, e.g. `ws://localhost:8090`
    pub url: String,
    /// Admin secret sent as a query parameter on connect
    pub secret_key: String,
    /// Reconnection behaviour after a lost connection
    pub reconnect: ReconnectPolicy,
    /// Upper bound on a single handshake
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            secret_key: String::new(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    /// Create a new config for the given base URL and secret
    pub fn new(url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Enable or disable automatic reconnection
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.reconnect.enabled = enabled;
        self
    }

    /// Set the delay between reconnection attempts
    pub fn reconnect_interval(mut self, d: Duration) -> Self {
        self.reconnect.interval = d;
        self
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.reconnect.max_attempts = n;
        self
    }

    /// Set the handshake timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Full handshake URL: `<url>/ws/admin?secretKey=<secret>`
    pub fn endpoint(&self) -> Result<reqwest::Url, WsError> {
        let base = format!("{}{}", self.url.trim_end_matches('/'), ADMIN_WS_PATH);
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| WsError::ConnectFailure(format!("invalid endpoint {base}: {e}")))?;
        url.query_pairs_mut()
            .append_pair(SECRET_KEY_PARAM, &self.secret_key);
        Ok(url)
    }
}

/// Connection state of an event client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Inbound event envelope: `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Decode a frame payload, returning `None` for anything malformed
    pub fn decode(payload: &[u8]) -> Option<Self> {
        serde_json::from_slice(payload).ok()
    }
}

/// Outbound envelope borrowing its payload
#[derive(Debug, Serialize)]
pub struct OutboundEnvelope<'a, T: ?Sized> {
    #[serde(rename = "type")]
    pub event_type: &'a str,
    pub data: &'a T,
}

impl<'a, T: ?Sized> OutboundEnvelope<'a, T> {
    pub fn new(event_type: &'a str, data: &'a T) -> Self {
        Self { event_type, data }
    }
}

/// WebSocket errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WsError {
    /// Handshake or dial failed
    #[error("Connection failed: {0}")]
    ConnectFailure(String),
    /// Operation requires a live connection
    #[error("WebSocket not connected")]
    NotConnected,
    /// Payload could not be encoded as JSON
    #[error("Serialization failed: {0}")]
    SerializationFailure(String),
    /// Socket write failed
    #[error("Send failed: {0}")]
    SendFailure(String),
}
