use rust_decimal::Decimal;

use super::error::ParseError;
use super::money;
use super::types::TransactionRecord;

/// Decode one input line into a [`TransactionRecord`]
///
/// Rejects blank lines, malformed JSON, records with an empty `user_id`,
/// negative quantities or prices, and records whose line total cannot be
/// represented in cents.
pub fn parse_line(line: &str) -> Result<TransactionRecord, ParseError> {
    let trimmed = line.trim_end_matches(['\r', '\n']).trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let record: TransactionRecord = serde_json::from_str(trimmed)?;

    if record.user_id.trim().is_empty() {
        return Err(ParseError::invalid("user_id", "must not be empty"));
    }
    if record.quantity < 0 {
        return Err(ParseError::invalid(
            "quantity",
            format!("must not be negative (got {})", record.quantity),
        ));
    }
    if record.unit_price.is_sign_negative() && !record.unit_price.is_zero() {
        return Err(ParseError::invalid(
            "price",
            format!("must not be negative (got {})", record.unit_price),
        ));
    }

    let total = record
        .unit_price
        .checked_mul(Decimal::from(record.quantity))
        .ok_or_else(|| ParseError::invalid("price", "line total overflows"))?;
    if money::to_cents(total).is_none() {
        return Err(ParseError::invalid("price", "line total overflows"));
    }

    Ok(record)
}

/// Decode one raw input line, rejecting bytes that are not UTF-8
pub fn parse_raw_line(line: &[u8]) -> Result<TransactionRecord, ParseError> {
    parse_line(std::str::from_utf8(line)?)
}
