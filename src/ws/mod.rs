//! Admin event stream client
//!
//! A single WebSocket connection to `<ws_url>/ws/admin`, with typed
//! `{"type", "data"}` event dispatch and fixed-interval reconnection.

mod client;
mod registry;
mod types;

pub use client::EventClient;
pub use registry::{dispatch, EventHandler, HandlerRegistry};
pub use types::{
    ConnectionState, Envelope, OutboundEnvelope, ReconnectPolicy, WsConfig, WsError,
    ADMIN_WS_PATH, SECRET_KEY_PARAM, SUBSCRIBE_TYPE,
};
