//! SQLite implementation of [`AnalyticsStore`]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::aggregator::BatchDelta;
use crate::core::shutdown::CancellationSignal;
use crate::record::money;

use super::error::{StoreError, StoreResult};
use super::pool::ConnectionPool;
use super::schema;
use super::{AnalyticsStore, AnomalyUser, UserAnalytics};

const UPSERT_SQL: &str = "
INSERT INTO user_analytics (user_id, total_orders, total_spent_cents)
VALUES (?1, ?2, ?3)
ON CONFLICT(user_id) DO UPDATE SET
    total_orders      = total_orders + excluded.total_orders,
    total_spent_cents = total_spent_cents + excluded.total_spent_cents";

const SELECT_USER_SQL: &str = "
SELECT user_id, total_orders, total_spent_cents
  FROM user_analytics
 WHERE user_id = ?1";

const TOP_USERS_SQL: &str = "
SELECT user_id, total_orders, total_spent_cents
  FROM user_analytics
 ORDER BY total_orders DESC, total_spent_cents DESC, user_id
 LIMIT ?1";

// x > mean + 2σ  ⇔  x > mean AND (x - mean)² > 4σ²
const ANOMALIES_SQL: &str = "
WITH active AS (
    SELECT total_orders, total_spent_cents
      FROM user_analytics
     WHERE total_orders > 0
),
means AS (
    SELECT COUNT(*)                            AS n,
           AVG(CAST(total_orders AS REAL))      AS avg_orders,
           AVG(CAST(total_spent_cents AS REAL)) AS avg_spent
      FROM active
),
stats AS (
    SELECT m.avg_orders,
           m.avg_spent,
           SUM((a.total_orders - m.avg_orders) * (a.total_orders - m.avg_orders))
               / NULLIF(m.n - 1, 0) AS var_orders,
           SUM((a.total_spent_cents - m.avg_spent) * (a.total_spent_cents - m.avg_spent))
               / NULLIF(m.n - 1, 0) AS var_spent
      FROM active a, means m
),
flagged AS (
    SELECT ua.user_id,
           ua.total_orders,
           ua.total_spent_cents,
           COALESCE(ua.total_orders > s.avg_orders
                    AND (ua.total_orders - s.avg_orders) * (ua.total_orders - s.avg_orders)
                        > 4 * s.var_orders, 0) AS order_anomaly,
           COALESCE(ua.total_spent_cents > s.avg_spent
                    AND (ua.total_spent_cents - s.avg_spent) * (ua.total_spent_cents - s.avg_spent)
                        > 4 * s.var_spent, 0) AS spending_anomaly
      FROM user_analytics ua, stats s
)
SELECT user_id, total_orders, total_spent_cents, order_anomaly, spending_anomaly
  FROM flagged
 WHERE order_anomaly = 1 OR spending_anomaly = 1
 ORDER BY total_orders DESC, total_spent_cents DESC, user_id";

/// Connection settings for [`SqliteStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a writer waits on a locked database before giving up
    pub busy_timeout: Duration,
    /// Idle connections kept for reuse
    pub max_idle_connections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            max_idle_connections: 4,
        }
    }
}

/// Analytics store backed by a SQLite database file
pub struct SqliteStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and provision the schema
    ///
    /// The path must name a file: every pooled connection opens it separately.
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> StoreResult<Self> {
        let path = path.as_ref();
        let pool = Arc::new(ConnectionPool::new(
            path,
            config.busy_timeout,
            config.max_idle_connections.max(1),
        ));

        {
            let conn = pool.acquire()?;
            schema::provision(&conn)?;
        }

        log::info!("analytics store ready at {}", path.display());
        Ok(Self { pool })
    }

    /// Run a blocking database operation on tokio's blocking pool
    async fn run_blocking<T, F>(&self, operation: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Arc<ConnectionPool>) -> StoreResult<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || operation(&pool))
            .await
            .map_err(|e| StoreError::Task {
                message: format!("Failed to execute database operation: {}", e),
            })?
    }
}

fn analytics_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserAnalytics> {
    Ok(UserAnalytics {
        user_id: row.get(0)?,
        total_orders: row.get(1)?,
        total_spent: money::from_cents(row.get(2)?),
    })
}

fn anomaly_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnomalyUser> {
    Ok(AnomalyUser {
        user_id: row.get(0)?,
        total_orders: row.get(1)?,
        total_spent: money::from_cents(row.get(2)?),
        order_anomaly: row.get(3)?,
        spending_anomaly: row.get(4)?,
    })
}

#[async_trait]
impl AnalyticsStore for SqliteStore {
    async fn apply_batch(
        &self,
        delta: &BatchDelta,
        cancel: &CancellationSignal,
    ) -> StoreResult<()> {
        if delta.is_empty() {
            return Ok(());
        }

        let rows = delta
            .iter()
            .map(|(user_id, user_delta)| {
                money::to_cents(user_delta.spent)
                    .map(|cents| (user_id.clone(), user_delta.order_count, cents))
                    .ok_or_else(|| {
                        StoreError::invalid(format!(
                            "spend for user '{}' does not fit in cents",
                            user_id
                        ))
                    })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        let cancel = cancel.clone();

        self.run_blocking(move |pool| {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }

            let users = rows.len();
            let commit_error = |source| StoreError::Commit { users, source };

            let mut conn = pool.acquire()?;
            // Dropping an uncommitted transaction rolls it back
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(commit_error)?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_SQL).map_err(commit_error)?;
                for (user_id, orders, cents) in &rows {
                    if cancel.is_cancelled() {
                        return Err(StoreError::Cancelled);
                    }
                    stmt.execute(params![user_id, orders, cents])
                        .map_err(commit_error)?;
                }
            }
            tx.commit().map_err(commit_error)?;

            log::debug!("committed batch for {} user(s)", users);
            Ok(())
        })
        .await
    }

    async fn user_analytics(&self, user_id: &str) -> StoreResult<UserAnalytics> {
        if user_id.is_empty() {
            return Err(StoreError::invalid("user_id cannot be empty"));
        }
        let user_id = user_id.to_string();

        self.run_blocking(move |pool| {
            let conn = pool.acquire()?;
            let found = conn
                .query_row(SELECT_USER_SQL, params![user_id], analytics_from_row)
                .optional()
                .map_err(|source| StoreError::Query {
                    operation: "user_analytics",
                    source,
                })?;
            Ok(found.unwrap_or_else(|| UserAnalytics::zero(user_id)))
        })
        .await
    }

    async fn top_users(&self, limit: usize) -> StoreResult<Vec<UserAnalytics>> {
        if limit == 0 {
            return Err(StoreError::invalid("limit must be positive, got 0"));
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.run_blocking(move |pool| {
            let query_error = |source| StoreError::Query {
                operation: "top_users",
                source,
            };
            let conn = pool.acquire()?;
            let mut stmt = conn.prepare_cached(TOP_USERS_SQL).map_err(query_error)?;
            let users = stmt
                .query_map(params![limit], analytics_from_row)
                .map_err(query_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_error)?;
            Ok(users)
        })
        .await
    }

    async fn user_anomalies(&self) -> StoreResult<Vec<AnomalyUser>> {
        self.run_blocking(|pool| {
            let query_error = |source| StoreError::Query {
                operation: "user_anomalies",
                source,
            };
            let conn = pool.acquire()?;
            let mut stmt = conn.prepare_cached(ANOMALIES_SQL).map_err(query_error)?;
            let anomalies = stmt
                .query_map([], anomaly_from_row)
                .map_err(query_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_error)?;
            Ok(anomalies)
        })
        .await
    }
}
