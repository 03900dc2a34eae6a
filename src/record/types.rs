use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money;

/// A single e-commerce order, exactly as decoded from one input line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub order_id: String,
    /// Aggregation key
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Per-unit price; `price` on the wire
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// `unit_price × quantity`, rounded to cents
    ///
    /// The parser has already checked that this product fits, so the
    /// saturating fallback is never reached for records it produced.
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .map(money::round_to_cents)
            .unwrap_or(Decimal::MAX)
    }
}
