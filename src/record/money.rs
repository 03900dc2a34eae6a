//! Currency amounts
//!
//! Spend is exposed as [`Decimal`] and persisted as integer cents. Every amount
//! entering an aggregate is rounded to cents first, so sums are exact and do
//! not depend on the order they are added in.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for currency
pub const CURRENCY_SCALE: u32 = 2;

/// Round an amount to whole cents, half away from zero
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer cents; `None` if it does not fit in an `i64`
pub fn to_cents(amount: Decimal) -> Option<i64> {
    round_to_cents(amount)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Convert integer cents back to an amount with two decimal places
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CURRENCY_SCALE)
}
