//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use riskwatch_infra::config;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "engine": {
            "max_retries": 4,
            "initial_backoff": 2000,
            "max_backoff": 60000,
            "sync_interval": 900000,
            "fetch_timeout": 20000,
            "sink_timeout": 5000,
            "shutdown_timeout": 10000,
            "trigger_queue_capacity": 16
        },
        "database": {
            "path": "/tmp/integration_test.db",
            "pool_size": 10
        },
        "source": {
            "snapshot_path": "/var/feeds/incidents.json"
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from JSON file");
    config.validate().expect("loaded config is valid");

    assert_eq!(config.engine.max_retries, 4);
    assert_eq!(config.engine.initial_backoff, Duration::from_secs(2));
    assert_eq!(config.engine.max_backoff, Duration::from_secs(60));
    assert_eq!(config.engine.sync_interval, Duration::from_secs(900));
    assert_eq!(config.engine.fetch_timeout, Duration::from_secs(20));
    assert_eq!(config.engine.trigger_queue_capacity, 16);
    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert_eq!(config.database.pool_size, 10);
    assert_eq!(config.source.snapshot_path, Some(PathBuf::from("/var/feeds/incidents.json")));
}

#[test]
fn test_invalid_backoff_bounds_fail_validation() {
    let toml_content = r#"
[engine]
initial_backoff = 5000
max_backoff = 1000
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("file parses");
    assert!(config.validate().is_err(), "max_backoff below initial_backoff must be rejected");
}
