//! Queue Publisher for sending lines
//!
//! There is exactly one publisher per queue. Dropping it (or calling
//! [`QueuePublisher::close`]) is the only way the queue is closed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::queue::error::{QueueError, QueueResult};

/// Producer handle for the ingestion queue
pub struct QueuePublisher {
    sender: mpsc::Sender<Vec<u8>>,
    capacity: usize,
    depth: Arc<AtomicUsize>,
}

impl QueuePublisher {
    pub(crate) fn new(
        sender: mpsc::Sender<Vec<u8>>,
        capacity: usize,
        depth: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            sender,
            capacity,
            depth,
        }
    }

    /// Push one line, suspending while the queue is full
    ///
    /// Fails with [`QueueError::Closed`] when every consumer has been dropped.
    /// The future is cancel-safe: if it is dropped while waiting for space the
    /// line is simply not enqueued.
    pub async fn push(&self, line: Vec<u8>) -> QueueResult<()> {
        let permit = self
            .sender
            .reserve()
            .await
            .map_err(|_| QueueError::Closed)?;
        self.depth.fetch_add(1, Ordering::AcqRel);
        permit.send(line);
        Ok(())
    }

    /// Close the queue; consumers drain what is left and then see `None`
    pub fn close(self) {
        drop(self);
    }

    /// Number of lines currently waiting in the queue
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once every consumer has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
