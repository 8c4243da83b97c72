//! Admin REST API
//!
//! Thin authenticated request/response helper over `reqwest`.

mod client;

pub use client::{AdminHttpClient, HttpError, API_KEY_HEADER};
