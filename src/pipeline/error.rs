//! Pipeline error types

use crate::aggregator::AggregateError;
use crate::core::error_handling::ContextualError;
use crate::queue::QueueError;
use crate::store::StoreError;

use super::feeder::FeedError;

/// Why a worker could not flush its batch
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Worker {worker} failed to flush a batch: {source}")]
    Flush {
        worker: usize,
        #[source]
        source: FlushError,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Failed to create ingestion queue: {0}")]
    Queue(#[from] QueueError),

    #[error("Worker task panicked: {message}")]
    WorkerPanicked { message: String },
}

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
