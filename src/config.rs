//! Configuration types for paanj-admin

use crate::admin::{AdminOptions, DEFAULT_API_URL, DEFAULT_WS_URL};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Credentials and endpoints
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_url: default_api_url(),
            ws_url: default_ws_url(),
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("api_url", &self.api_url)
            .field("ws_url", &self.ws_url)
            .finish()
    }
}

/// Event stream reconnection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Reconnect automatically after the stream drops
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed delay between attempts (milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Attempts before giving up (0 = infinite)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Handshake timeout (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    5_000
}
fn default_max_attempts() -> u32 {
    10
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5_000,
            max_attempts: 10,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Options for [`crate::Admin::new`]
    pub fn admin_options(&self) -> AdminOptions {
        AdminOptions {
            api_url: self.admin.api_url.clone(),
            ws_url: self.admin.ws_url.clone(),
            auto_reconnect: self.reconnect.enabled,
            reconnect_interval: Duration::from_millis(self.reconnect.interval_ms),
            max_reconnect_attempts: self.reconnect.max_attempts,
            connect_timeout: Duration::from_millis(self.reconnect.connect_timeout_ms),
            ..Default::default()
        }
    }
}

/// Show only the first few characters of a secret
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}
