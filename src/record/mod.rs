//! Order records and their line decoder
//!
//! An input line is one JSON object describing a single order. Decoding never
//! aborts the pipeline: a bad line comes back as a [`ParseError`] that the
//! caller logs and drops.

mod error;
pub mod money;
mod parser;
mod types;

pub use error::ParseError;
pub use parser::{parse_line, parse_raw_line};
pub use types::TransactionRecord;
