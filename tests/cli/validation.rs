//! Argument validation and settings resolution tests

use std::path::PathBuf;

use clap::Parser;
use orderstats::app::cli::args::*;
use orderstats::app::startup::resolve_settings;
use orderstats::app::{Settings, StartupError};
use orderstats::core::error_handling::ContextualError;

#[test]
fn test_input_file_is_required() {
    let args = Args::try_parse_from(["orderstats", "--no-color"]).unwrap();
    let err = args.validate().unwrap_err();
    assert!(err.details().contains("--file"));
}

#[test]
fn test_empty_paths_rejected() {
    let args = Args {
        file: Some(PathBuf::new()),
        ..Args::default()
    };
    assert!(args.validate().is_err());

    let args = Args {
        file: Some(PathBuf::from("orders.jsonl")),
        db_path: Some(PathBuf::new()),
        ..Args::default()
    };
    assert!(args.validate().is_err());
}

#[test]
fn test_toml_only_values_validated() {
    let base = Args {
        file: Some(PathBuf::from("orders.jsonl")),
        ..Args::default()
    };
    assert!(base.validate().is_ok());

    let zero_ttl = Args {
        cache_ttl_secs: Some(0),
        ..base.clone()
    };
    assert!(zero_ttl.validate().is_err());

    let bad_level = Args {
        log_level: Some("loud".to_string()),
        ..base.clone()
    };
    assert!(bad_level.validate().is_err());

    let upper_format = Args {
        log_format: Some("JSON".to_string()),
        ..base
    };
    assert!(upper_format.validate().is_ok());
}

#[tokio::test]
async fn test_resolve_settings_applies_defaults() {
    let cli = Args::try_parse_from([
        "orderstats",
        "-f",
        "orders.jsonl",
        "-c",
        "/nonexistent/orderstats.toml",
    ])
    .unwrap();

    let err = resolve_settings(&cli).await.unwrap_err();
    assert!(matches!(err, StartupError::Config { .. }));
    assert!(err.is_user_actionable());

    let cli = Args::try_parse_from(["orderstats", "-f", "orders.jsonl", "-w", "2", "--no-color"]).unwrap();
    let settings = Settings::from_args(&cli).unwrap();
    assert_eq!(settings.pipeline.workers, 2);
    assert_eq!(settings.db_path, PathBuf::from(DEFAULT_DB_PATH));
    assert!(!settings.color);
}
