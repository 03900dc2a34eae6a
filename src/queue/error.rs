//! Queue Error Types

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is closed: no consumers remain")]
    Closed,

    #[error("Invalid queue capacity: {capacity} (must be greater than zero)")]
    InvalidCapacity { capacity: usize },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
