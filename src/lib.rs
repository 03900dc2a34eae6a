//! Concurrent ingestion of e-commerce order records into per-user analytics
//!
//! Lines flow from a reader through a bounded [`queue`] to a pool of
//! [`pipeline`] workers. Each worker parses [`record`]s, folds them into a
//! per-batch delta, merges that into the sharded [`aggregator`] and commits it
//! to the [`store`] in one transaction. The [`service`] layer answers
//! read-side questions from the store through an optional cache.

pub mod aggregator;
pub mod app;
pub mod core;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod service;
pub mod store;
