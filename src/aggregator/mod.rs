//! Per-user aggregation
//!
//! Workers fold their batches into a [`BatchDelta`] without any locking, then
//! merge it into the shared [`UserLockRegistry`]. Every merge is an addition,
//! so the order in which workers merge never changes the result.
//!
//! The registry is an in-memory running view for introspection. The store is
//! the source of truth for the aggregates.

mod analytics;
mod delta;
mod error;
mod registry;

pub use analytics::UserAnalytics;
pub use delta::{BatchDelta, UserDelta};
pub use error::{AggregateError, AggregateResult};
pub use registry::{UserLockRegistry, DEFAULT_SHARDS};
