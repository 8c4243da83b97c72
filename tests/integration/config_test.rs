//! Integration tests for configuration loading

use paanj_admin::config::Config;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [admin]
        secret_key = "sk_file"
        ws_url = "ws://events.internal:8090"

        [reconnect]
        interval_ms = 1000
        max_attempts = 0
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.admin.secret_key, "sk_file");
    assert_eq!(config.admin.api_url, "http://localhost:3000");

    let options = config.admin_options();
    assert_eq!(options.ws_url, "ws://events.internal:8090");
    assert_eq!(options.reconnect_interval, Duration::from_secs(1));
    assert_eq!(options.max_reconnect_attempts, 0);
}

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.admin.ws_url, "ws://localhost:8090");
    assert_eq!(config.reconnect.max_attempts, 10);
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_load_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[reconnect]\ninterval_ms = \"soon\"").unwrap();

    assert!(Config::load(file.path()).is_err());
}
