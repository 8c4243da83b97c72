//! paanj-admin: server-side admin SDK for Paanj
//!
//! This library provides:
//! - A reconnecting WebSocket client for admin event subscriptions
//! - An authenticated request helper for the admin REST API
//! - The [`Admin`] facade bundling both behind one set of options
//! - TOML configuration and structured logging/metrics setup

pub mod admin;
pub mod cli;
pub mod config;
pub mod http;
pub mod telemetry;
pub mod ws;

pub use admin::{Admin, AdminOptions};
pub use http::{AdminHttpClient, HttpError};
pub use ws::{ConnectionState, EventClient, EventHandler, WsConfig, WsError};
