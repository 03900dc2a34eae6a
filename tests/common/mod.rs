//! Common test utilities and helpers
//!
//! Shared fixtures for the integration tests: order lines, in-memory readers
//! and throwaway SQLite stores.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use orderstats::store::{SqliteStore, StoreConfig};
use tempfile::TempDir;

/// One JSON order line, without the trailing newline
pub fn order_line(order_id: &str, user_id: &str, quantity: i64, price: &str) -> String {
    format!(
        r#"{{"order_id":"{}","user_id":"{}","product_id":"p-{}","quantity":{},"price":{},"timestamp":"2024-03-01T12:00:00Z"}}"#,
        order_id, user_id, order_id, quantity, price
    )
}

/// Newline-delimited input held in memory
pub fn reader_from(lines: &[String]) -> Cursor<Vec<u8>> {
    let mut input = lines.join("\n");
    input.push('\n');
    Cursor::new(input.into_bytes())
}

/// A fresh store in its own temporary directory
pub struct TempStore {
    pub dir: TempDir,
    pub path: PathBuf,
    pub store: Arc<SqliteStore>,
}

pub fn temp_store() -> TempStore {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analytics.db");
    let store = Arc::new(SqliteStore::open(&path, StoreConfig::default()).unwrap());
    TempStore { dir, path, store }
}

/// The two-user scenario: u1 buys 10×2.00 and 5×1.00, u2 buys 100×1.00
pub fn scenario_lines() -> Vec<String> {
    vec![
        order_line("o1", "u1", 2, "10.00"),
        order_line("o2", "u1", 1, "5.00"),
        order_line("o3", "u2", 1, "100.00"),
    ]
}
