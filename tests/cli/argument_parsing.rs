//! Core CLI argument parsing tests

use std::path::PathBuf;

use clap::Parser;
use orderstats::app::cli::args::*;
use orderstats::app::startup::parse_args;

#[test]
fn test_short_and_long_flags() {
    let args = Args::try_parse_from([
        "orderstats",
        "-f",
        "orders.jsonl",
        "-w",
        "4",
        "-b",
        "250",
        "-d",
        "stats.db",
        "--queue-capacity",
        "64",
    ])
    .unwrap();

    assert_eq!(args.file, Some(PathBuf::from("orders.jsonl")));
    assert_eq!(args.workers, Some(4));
    assert_eq!(args.batch_size, Some(250));
    assert_eq!(args.db_path, Some(PathBuf::from("stats.db")));
    assert_eq!(args.queue_capacity, Some(64));
}

#[test]
fn test_unset_options_stay_unset() {
    let args = Args::try_parse_from(["orderstats", "--file", "-"]).unwrap();

    assert_eq!(args.file, Some(PathBuf::from("-")));
    assert_eq!(args.workers, None);
    assert_eq!(args.batch_size, None);
    assert_eq!(args.db_path, None);
    assert_eq!(args.top, None);
    assert!(!args.anomalies);
    assert_eq!(args.cache_enabled, None);
}

#[test]
fn test_zero_and_garbage_counts_rejected() {
    assert!(Args::try_parse_from(["orderstats", "-f", "x", "-w", "0"]).is_err());
    assert!(Args::try_parse_from(["orderstats", "-f", "x", "-b", "-3"]).is_err());
    assert!(Args::try_parse_from(["orderstats", "-f", "x", "--queue-capacity", "lots"]).is_err());
    assert!(Args::try_parse_from(["orderstats", "-f", "x", "--top", "0"]).is_err());
}

#[test]
fn test_color_flags_conflict() {
    let both = Args::try_parse_from(["orderstats", "--color", "--no-color"]);
    assert!(both.is_err());

    let forced = Args::try_parse_from(["orderstats", "--color"]).unwrap();
    assert_eq!(forced.color_choice(), Some(true));
    let disabled = Args::try_parse_from(["orderstats", "--no-color"]).unwrap();
    assert_eq!(disabled.color_choice(), Some(false));
    assert!(!disabled.use_color());
}

#[test]
fn test_log_options_restricted_to_known_values() {
    let args = Args::try_parse_from([
        "orderstats",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--log-file",
        "run.log",
    ])
    .unwrap();
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_file, Some(PathBuf::from("run.log")));

    assert!(Args::try_parse_from(["orderstats", "--log-level", "loud"]).is_err());
    assert!(Args::try_parse_from(["orderstats", "--log-format", "xml"]).is_err());
}

#[test]
fn test_report_flags() {
    let args = Args::try_parse_from(["orderstats", "-f", "x", "--top", "5", "--anomalies"]).unwrap();
    assert_eq!(args.top, Some(5));
    assert!(args.anomalies);
}

#[test]
fn test_help_and_version_are_not_failures() {
    let help = parse_args(["orderstats", "--help", "--no-color"]).unwrap_err();
    assert!(!help.use_stderr());

    let version = parse_args(["orderstats", "--version"]).unwrap_err();
    assert!(!version.use_stderr());

    let bad = parse_args(["orderstats", "--bogus"]).unwrap_err();
    assert!(bad.use_stderr());
}
