//! Durable schema
//!
//! Every statement is idempotent, so provisioning runs on each open.

use rusqlite::Connection;

use super::error::{StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user_analytics (
    user_id           TEXT PRIMARY KEY,
    total_orders      INTEGER NOT NULL DEFAULT 0,
    total_spent_cents INTEGER NOT NULL DEFAULT 0,
    last_updated      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_user_analytics_orders
    ON user_analytics(total_orders DESC);

CREATE INDEX IF NOT EXISTS idx_user_analytics_spent
    ON user_analytics(total_spent_cents DESC);

CREATE TRIGGER IF NOT EXISTS trg_user_analytics_last_updated
    AFTER UPDATE OF total_orders, total_spent_cents ON user_analytics
    FOR EACH ROW
BEGIN
    UPDATE user_analytics
       SET last_updated = CURRENT_TIMESTAMP
     WHERE user_id = NEW.user_id;
END;
";

/// Create the analytics table, its indexes and the `last_updated` trigger
pub(crate) fn provision(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|source| StoreError::Schema { source })?;
    log::debug!("schema provisioned");
    Ok(())
}
