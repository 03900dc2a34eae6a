//! Whole runs: settings in, committed totals out

use std::io::Write;
use std::path::PathBuf;

use orderstats::app::cli::args::Args;
use orderstats::app::startup::execute;
use orderstats::app::{Settings, StartupError};
use orderstats::core::shutdown::ShutdownCoordinator;
use orderstats::pipeline::RunOutcome;
use orderstats::store::{AnalyticsStore, SqliteStore, StoreConfig};
use rust_decimal_macros::dec;
use tempfile::{NamedTempFile, TempDir};

use crate::common::{order_line, scenario_lines};

fn input_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn settings_for(input: PathBuf, db_path: PathBuf) -> Settings {
    let args = Args {
        file: Some(input),
        db_path: Some(db_path),
        workers: Some(3),
        batch_size: Some(2),
        no_color: true,
        top: Some(2),
        anomalies: true,
        cache_enabled: Some(true),
        ..Args::default()
    };
    Settings::from_args(&args).unwrap()
}

#[tokio::test]
async fn test_execute_ingests_file_into_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("stats.db");
    let mut lines = scenario_lines();
    lines.push("garbage".to_string());
    let input = input_file(&lines);

    let settings = settings_for(input.path().to_path_buf(), db_path.clone());
    let report = execute(&settings, ShutdownCoordinator::new().signal())
        .await
        .unwrap();

    assert_eq!(report.outcome(), RunOutcome::Completed);
    assert_eq!(report.summary.records_processed, 3);
    assert_eq!(report.summary.records_skipped, 1);

    let store = SqliteStore::open(&db_path, StoreConfig::default()).unwrap();
    let u1 = store.user_analytics("u1").await.unwrap();
    assert_eq!((u1.total_orders, u1.total_spent), (2, dec!(25)));
    let u2 = store.user_analytics("u2").await.unwrap();
    assert_eq!((u2.total_orders, u2.total_spent), (1, dec!(100)));
}

#[tokio::test]
async fn test_execute_is_additive_across_runs() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("stats.db");
    let input = input_file(&[order_line("o1", "u9", 4, "2.50")]);
    let settings = settings_for(input.path().to_path_buf(), db_path.clone());

    for _ in 0..3 {
        let report = execute(&settings, ShutdownCoordinator::new().signal())
            .await
            .unwrap();
        assert_eq!(report.exit_code(), 0);
    }

    let store = SqliteStore::open(&db_path, StoreConfig::default()).unwrap();
    let u9 = store.user_analytics("u9").await.unwrap();
    assert_eq!((u9.total_orders, u9.total_spent), (3, dec!(30)));
}

#[tokio::test]
async fn test_execute_missing_input_is_user_error() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path().join("absent.jsonl"), dir.path().join("stats.db"));

    let err = execute(&settings, ShutdownCoordinator::new().signal())
        .await
        .unwrap_err();
    assert!(matches!(err, StartupError::Input { .. }));
}

#[tokio::test]
async fn test_execute_unopenable_store_fails() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&scenario_lines());
    let db_path = dir.path().join("missing").join("stats.db");
    let settings = settings_for(input.path().to_path_buf(), db_path);

    let err = execute(&settings, ShutdownCoordinator::new().signal())
        .await
        .unwrap_err();
    assert!(matches!(err, StartupError::Store(_)));
}
