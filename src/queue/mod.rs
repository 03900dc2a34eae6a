//! Bounded Ingestion Queue
//!
//! A fixed-capacity queue of raw input lines (bytes, undecoded) with one producer and any number
//! of competing consumers. Every line is delivered to exactly one consumer.
//!
//! # Overview
//!
//! - **Backpressure**: [`QueuePublisher::push`] suspends while the queue is full,
//!   so memory stays bounded by the configured capacity
//! - **Competing consumers**: [`QueueConsumer`] clones share a single receiver
//! - **Close by drop**: dropping the publisher closes the queue; consumers see
//!   `None` from [`QueueConsumer::pop`] only once the queue is closed and drained
//!
//! ```text
//!                       ┌───────────────────────────┐
//!  ┌────────┐   push    │ ┌───┬───┬───┬───┬───┬───┐ │   pop   ┌──────────┐
//!  │ Feeder ├──────────►│ │ 1 │ 2 │ 3 │ 4 │...│ N │ ├────────►│ Worker A │
//!  └────────┘           │ └───┴───┴───┴───┴───┴───┘ ├────────►│ Worker B │
//!                       │  capacity N (bounded)     ├────────►│ Worker C │
//!                       └───────────────────────────┘         └──────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use orderstats::queue::ingest_queue;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (publisher, consumer) = ingest_queue(128)?;
//!
//! publisher.push(br#"{"order_id":"o-1"}"#.to_vec()).await?;
//! publisher.close();
//!
//! while let Some(line) = consumer.pop().await {
//!     println!("Received: {}", String::from_utf8_lossy(&line));
//! }
//! # Ok(())
//! # }
//! ```

mod consumer;
mod error;
mod publisher;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

pub use consumer::QueueConsumer;
pub use error::{QueueError, QueueResult};
pub use publisher::QueuePublisher;

/// Create a bounded queue holding at most `capacity` lines
///
/// Returns the single publisher and a consumer that can be cloned once per
/// worker. A capacity of zero is rejected.
pub fn ingest_queue(capacity: usize) -> QueueResult<(QueuePublisher, QueueConsumer)> {
    if capacity == 0 {
        return Err(QueueError::InvalidCapacity { capacity });
    }

    let (sender, receiver) = mpsc::channel(capacity);
    let depth = Arc::new(AtomicUsize::new(0));

    let publisher = QueuePublisher::new(sender, capacity, Arc::clone(&depth));
    let consumer = QueueConsumer::new(Arc::new(Mutex::new(receiver)), capacity, depth);

    Ok((publisher, consumer))
}

#[cfg(test)]
mod tests;
