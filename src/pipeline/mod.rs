//! Ingestion pipeline
//!
//! ```text
//! input ──► feeder ──► bounded queue ──► workers (parse, batch)
//!                                           │
//!                                           ├──► per-user aggregator
//!                                           └──► store (atomic batch commit)
//! ```
//!
//! [`IngestPipeline::run`] wires the pieces together and always returns an
//! [`IngestReport`], whether the input drained, shutdown was requested, or a
//! worker failed.

mod error;
pub mod feeder;
mod pool;
mod summary;
pub mod worker;

pub use error::{FlushError, PipelineError};
pub use feeder::{feed_lines, FeedError, FeedStats};
pub use pool::{IngestPipeline, IngestReport, PipelineConfig};
pub use summary::{IngestSummary, RunOutcome};
