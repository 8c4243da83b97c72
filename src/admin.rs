//! Admin SDK entry point
//!
//! Bundles the event stream client and the REST client behind one set of
//! options.

use crate::http::{AdminHttpClient, HttpError};
use crate::ws::{EventClient, EventHandler, ReconnectPolicy, WsConfig, WsError};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8090";

/// Options for [`Admin::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOptions {
    /// REST API base URL
    pub api_url: String,
    /// WebSocket base URL
    pub ws_url: String,
    /// Reconnect the event stream after it drops
    pub auto_reconnect: bool,
    /// Fixed delay between reconnection attempts
    pub reconnect_interval: Duration,
    /// Maximum reconnection attempts (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Event stream handshake timeout
    pub connect_timeout: Duration,
    /// REST request timeout
    pub request_timeout: Duration,
}

impl Default for AdminOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            auto_reconnect: true,
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 10,
            connect_timeout: Duration::from_secs(10),
            request_timeout: AdminHttpClient::DEFAULT_TIMEOUT,
        }
    }
}

impl AdminOptions {
    /// Replace blank URLs and zero durations with the defaults
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.api_url.trim().is_empty() {
            self.api_url = defaults.api_url;
        }
        if self.ws_url.trim().is_empty() {
            self.ws_url = defaults.ws_url;
        }
        if self.reconnect_interval.is_zero() {
            self.reconnect_interval = defaults.reconnect_interval;
        }
        if self.connect_timeout.is_zero() {
            self.connect_timeout = defaults.connect_timeout;
        }
        if self.request_timeout.is_zero() {
            self.request_timeout = defaults.request_timeout;
        }
        self
    }

    fn ws_config(&self, secret_key: &str) -> WsConfig {
        WsConfig {
            url: self.ws_url.clone(),
            secret_key: secret_key.to_string(),
            reconnect: ReconnectPolicy {
                enabled: self.auto_reconnect,
                interval: self.reconnect_interval,
                max_attempts: self.max_reconnect_attempts,
            },
            connect_timeout: self.connect_timeout,
        }
    }
}

/// Server-side admin client
#[derive(Debug, Clone)]
pub struct Admin {
    options: AdminOptions,
    ws: EventClient,
    http: AdminHttpClient,
}

impl Admin {
    pub fn new(secret_key: impl Into<String>, options: AdminOptions) -> Result<Self, HttpError> {
        let secret_key = secret_key.into();
        let options = options.normalized();

        let ws = EventClient::new(options.ws_config(&secret_key));
        let http =
            AdminHttpClient::with_timeout(&secret_key, &options.api_url, options.request_timeout)?;

        Ok(Self { options, ws, http })
    }

    pub fn options(&self) -> &AdminOptions {
        &self.options
    }

    pub async fn connect(&self) -> Result<(), WsError> {
        self.ws.connect().await
    }

    pub async fn disconnect(&self) {
        self.ws.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.ws.is_connected().await
    }

    pub async fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), WsError> {
        self.ws.send(payload).await
    }

    pub async fn subscribe<T: Serialize + ?Sized>(&self, subscription: &T) -> Result<(), WsError> {
        self.ws.subscribe(subscription).await
    }

    pub async fn on<F>(&self, event_type: impl Into<String>, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.ws.on(event_type, handler).await
    }

    pub async fn add_handler<H>(&self, event_type: impl Into<String>, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.ws.add_handler(event_type, handler).await
    }

    /// The underlying event stream client
    pub fn ws(&self) -> &EventClient {
        &self.ws
    }

    /// The underlying REST client
    pub fn http(&self) -> &AdminHttpClient {
        &self.http
    }
}
