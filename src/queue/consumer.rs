//! Queue Consumer for draining lines
//!
//! Consumers are competing readers: clones share one receiver, so each line is
//! handed to exactly one of them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Consumer handle for the ingestion queue
///
/// # Example
///
/// ```rust,no_run
/// # use orderstats::queue::ingest_queue;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (publisher, consumer) = ingest_queue(16)?;
/// let worker_consumer = consumer.clone();
///
/// tokio::spawn(async move {
///     while let Some(line) = worker_consumer.pop().await {
///         println!("Processing: {}", String::from_utf8_lossy(&line));
///     }
/// });
/// # drop(publisher);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueueConsumer {
    receiver: Arc<Mutex<mpsc::Receiver<Vec<u8>>>>,
    capacity: usize,
    depth: Arc<AtomicUsize>,
}

impl QueueConsumer {
    pub(crate) fn new(
        receiver: Arc<Mutex<mpsc::Receiver<Vec<u8>>>>,
        capacity: usize,
        depth: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            receiver,
            capacity,
            depth,
        }
    }

    /// Take the next line, suspending while the queue is empty
    ///
    /// Returns `None` once the publisher is gone and every queued line has
    /// been taken. Cancel-safe: dropping the future never loses a line.
    pub async fn pop(&self) -> Option<Vec<u8>> {
        let mut receiver = self.receiver.lock().await;
        let line = receiver.recv().await?;
        self.depth.fetch_sub(1, Ordering::AcqRel);
        Some(line)
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
}
