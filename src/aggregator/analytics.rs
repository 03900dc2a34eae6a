use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::delta::UserDelta;
use super::error::{AggregateError, AggregateResult};

/// Running totals for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub user_id: String,
    pub total_orders: i64,
    pub total_spent: Decimal,
}

impl UserAnalytics {
    /// The aggregate of a user that has never ordered anything
    pub fn zero(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_orders: 0,
            total_spent: Decimal::ZERO,
        }
    }

    /// Add a delta to the running totals
    pub fn apply(&mut self, delta: &UserDelta) -> AggregateResult<()> {
        let overflow = || AggregateError::Overflow {
            user_id: self.user_id.clone(),
        };
        let orders = self
            .total_orders
            .checked_add(delta.order_count)
            .ok_or_else(overflow)?;
        let spent = self
            .total_spent
            .checked_add(delta.spent)
            .ok_or_else(overflow)?;

        self.total_orders = orders;
        self.total_spent = spent;
        Ok(())
    }
}
