//! Integration tests for paanj-admin

mod admin_test;
mod config_test;
mod support;
