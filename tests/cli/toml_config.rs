//! CLI TOML configuration tests
//!
//! Tests for TOML key mapping, rejected values and CLI overrides.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use orderstats::app::cli::args::*;
use orderstats::app::cli::ConfigError;
use serial_test::serial;
use tempfile::NamedTempFile;
use toml::Table;

#[test]
fn test_toml_keys_map_to_args() {
    let config: Table = toml::from_str(
        r#"
        db-path = "/var/lib/orderstats/stats.db"
        workers = 6
        batch-size = 100
        queue-capacity = 2048
        log-level = "warn"
        log-format = "ext"
        log-file = "/tmp/orderstats.log"
        color = false
        cache-enabled = true
        cache-ttl-secs = 600
        busy-timeout-ms = 2500
        max-idle-connections = 2
        "#,
    )
    .unwrap();

    let mut args = Args::default();
    Args::apply_toml_values(&mut args, &config).unwrap();

    assert_eq!(args.db_path, Some(PathBuf::from("/var/lib/orderstats/stats.db")));
    assert_eq!(args.workers, Some(6));
    assert_eq!(args.batch_size, Some(100));
    assert_eq!(args.queue_capacity, Some(2048));
    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/orderstats.log")));
    assert_eq!(args.config_color, Some(false));
    assert_eq!(args.cache_enabled, Some(true));
    assert_eq!(args.cache_ttl_secs, Some(600));
    assert_eq!(args.busy_timeout_ms, Some(2500));
    assert_eq!(args.max_idle_connections, Some(2));
}

#[test]
fn test_toml_rejects_non_positive_counts() {
    for (key, value) in [("workers", 0), ("batch-size", -1), ("queue-capacity", 0)] {
        let mut config = Table::new();
        config.insert(key.to_string(), toml::Value::Integer(value));
        let mut args = Args::default();
        assert!(
            Args::apply_toml_values(&mut args, &config).is_err(),
            "{} = {} should be rejected",
            key,
            value
        );
    }

    let mut config = Table::new();
    config.insert("workers".to_string(), toml::Value::String("ten".to_string()));
    assert!(Args::apply_toml_values(&mut Args::default(), &config).is_err());
}

#[test]
fn test_toml_log_file_none_disables_file_logging() {
    let mut args = Args {
        log_file: Some(PathBuf::from("old.log")),
        ..Args::default()
    };
    let mut config = Table::new();
    config.insert("log-file".to_string(), toml::Value::String("none".to_string()));

    Args::apply_toml_values(&mut args, &config).unwrap();
    assert_eq!(args.log_file, None);
}

#[test]
fn test_cli_overrides_toml() {
    let mut file_args = Args::default();
    let mut config = Table::new();
    config.insert("workers".to_string(), toml::Value::Integer(6));
    config.insert("batch-size".to_string(), toml::Value::Integer(100));
    config.insert("color".to_string(), toml::Value::Boolean(true));
    Args::apply_toml_values(&mut file_args, &config).unwrap();

    let cli = Args::try_parse_from(["orderstats", "-f", "in.jsonl", "-w", "2", "--no-color"]).unwrap();
    let merged = file_args.override_with(&cli);

    assert_eq!(merged.workers, Some(2));
    assert_eq!(merged.batch_size, Some(100));
    assert_eq!(merged.file, Some(PathBuf::from("in.jsonl")));
    assert_eq!(merged.color_choice(), Some(false));
}

#[tokio::test]
#[serial]
async fn test_config_file_loading() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "workers = 3\ndb-path = \"from-config.db\"").unwrap();

    let args = Args::from_config_file(Some(file.path())).await.unwrap();
    assert_eq!(args.workers, Some(3));
    assert_eq!(args.db_path, Some(PathBuf::from("from-config.db")));
}

#[tokio::test]
#[serial]
async fn test_config_file_errors() {
    let missing = Args::from_config_file(Some(std::path::Path::new("/nonexistent/orderstats.toml"))).await;
    assert!(matches!(missing, Err(ConfigError::NotFound { .. })));

    let mut broken = NamedTempFile::new().unwrap();
    writeln!(broken, "workers = [").unwrap();
    let parsed = Args::from_config_file(Some(broken.path())).await;
    assert!(matches!(parsed, Err(ConfigError::Parse { .. })));

    let mut invalid = NamedTempFile::new().unwrap();
    writeln!(invalid, "batch-size = 0").unwrap();
    let rejected = Args::from_config_file(Some(invalid.path())).await;
    assert!(matches!(rejected, Err(ConfigError::Invalid { .. })));
}
