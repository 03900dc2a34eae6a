//! Durable analytics storage
//!
//! The store is the source of truth for per-user totals. Batches are applied
//! as additive upserts inside one transaction each, so a batch is either
//! fully visible or not at all, and totals never go backwards.

mod error;
mod pool;
mod schema;
mod sqlite;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregator::BatchDelta;
use crate::core::shutdown::CancellationSignal;

pub use crate::aggregator::UserAnalytics;
pub use error::{StoreError, StoreResult};
pub use sqlite::{SqliteStore, StoreConfig};

/// A user whose order count or spend sits more than two standard deviations
/// above the mean across active users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyUser {
    pub user_id: String,
    pub total_orders: i64,
    pub total_spent: Decimal,
    pub order_anomaly: bool,
    pub spending_anomaly: bool,
}

/// Storage backend for user analytics
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Atomically add every user's delta to the stored totals
    ///
    /// Returns [`StoreError::Cancelled`] when shutdown was requested before
    /// the final commit was issued; nothing from the batch is stored then.
    async fn apply_batch(&self, delta: &BatchDelta, cancel: &CancellationSignal)
        -> StoreResult<()>;

    /// Stored totals for a user; an unknown user has zero totals
    async fn user_analytics(&self, user_id: &str) -> StoreResult<UserAnalytics>;

    /// Users with the most orders, ties broken by spend and then by id
    async fn top_users(&self, limit: usize) -> StoreResult<Vec<UserAnalytics>>;

    async fn user_anomalies(&self) -> StoreResult<Vec<AnomalyUser>>;
}
