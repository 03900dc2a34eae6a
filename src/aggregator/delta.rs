//! Per-batch deltas
//!
//! A [`BatchDelta`] belongs to a single worker and is built without any
//! synchronization. It lives for exactly one flush.

use std::collections::btree_map;
use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::record::TransactionRecord;

/// What one batch adds to a single user's totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserDelta {
    pub order_count: i64,
    pub spent: Decimal,
}

/// Per-user deltas of one batch, ordered by user id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDelta {
    users: BTreeMap<String, UserDelta>,
}

impl BatchDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum a batch of records per user
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut delta = Self::new();
        for record in records {
            delta.add(record);
        }
        delta
    }

    /// Count one order and its line total against the record's user
    pub fn add(&mut self, record: &TransactionRecord) {
        let entry = self.users.entry(record.user_id.clone()).or_default();
        entry.order_count += 1;
        entry.spent += record.line_total();
    }

    pub fn get(&self, user_id: &str) -> Option<&UserDelta> {
        self.users.get(user_id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, UserDelta> {
        self.users.iter()
    }

    /// Number of distinct users touched by the batch
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Total number of orders across all users
    pub fn order_count(&self) -> i64 {
        self.users.values().map(|d| d.order_count).sum()
    }
}

impl<'a> IntoIterator for &'a BatchDelta {
    type Item = (&'a String, &'a UserDelta);
    type IntoIter = btree_map::Iter<'a, String, UserDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(user: &str, price: Decimal, quantity: i64) -> TransactionRecord {
        TransactionRecord {
            order_id: format!("order-{}-{}", user, quantity),
            user_id: user.to_string(),
            product_id: "p".to_string(),
            quantity,
            unit_price: price,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_from_records_sums_per_user() {
        let delta = BatchDelta::from_records(&[
            record("u1", dec!(10), 2),
            record("u2", dec!(100), 1),
            record("u1", dec!(5), 1),
        ]);

        assert_eq!(delta.len(), 2);
        assert_eq!(delta.order_count(), 3);
        assert_eq!(
            delta.get("u1"),
            Some(&UserDelta {
                order_count: 2,
                spent: dec!(25)
            })
        );
        assert_eq!(delta.get("u2").map(|d| d.spent), Some(dec!(100)));
    }

    #[test]
    fn test_iteration_is_ordered_by_user() {
        let delta = BatchDelta::from_records(&[
            record("zed", dec!(1), 1),
            record("amy", dec!(1), 1),
            record("kim", dec!(1), 1),
        ]);
        let users: Vec<&str> = delta.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(users, vec!["amy", "kim", "zed"]);
    }

    #[test]
    fn test_empty_batch() {
        let delta = BatchDelta::from_records(&[]);
        assert!(delta.is_empty());
        assert_eq!(delta.order_count(), 0);
    }
}
