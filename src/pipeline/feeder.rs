//! Feeder: the single producer
//!
//! Reads lines from any async buffered reader and pushes them onto the
//! ingestion queue as raw bytes. Decoding is left to the workers, so a line
//! that is not UTF-8 is skipped like any other bad record. The publisher is owned here, so the queue closes as soon
//! as the feeder returns, however it returns.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::core::shutdown::CancellationSignal;
use crate::queue::{QueueError, QueuePublisher};

/// What the feeder did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub lines_read: u64,
    /// True when the feeder stopped before reaching the end of its input
    pub interrupted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to read input after line {lines_read}: {source}")]
    Read {
        lines_read: u64,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Lines that were read and queued before the failure
    pub fn lines_read(&self) -> u64 {
        match self {
            FeedError::Read { lines_read, .. } => *lines_read,
        }
    }
}

/// Push every input line onto the queue until end of input or shutdown
///
/// Cancellation is checked before each read, and both the read and the push
/// race against it. Lines already queued are left for the workers.
pub async fn feed_lines<R>(
    reader: R,
    publisher: QueuePublisher,
    shutdown: CancellationSignal,
) -> Result<FeedStats, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut segments = reader.split(b'\n');

    loop {
        if shutdown.is_cancelled() {
            stats.interrupted = true;
            break;
        }

        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                stats.interrupted = true;
                break;
            }
            next = segments.next_segment() => next,
        };

        let mut line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => {
                return Err(FeedError::Read {
                    lines_read: stats.lines_read,
                    source,
                })
            }
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        stats.lines_read += 1;

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                stats.interrupted = true;
                break;
            }
            pushed = publisher.push(line) => {
                if let Err(QueueError::Closed) = pushed {
                    log::warn!("all workers stopped; feeder giving up after {} lines", stats.lines_read);
                    stats.interrupted = true;
                    break;
                }
            }
        }
    }

    if stats.interrupted {
        log::warn!("feeder interrupted after {} lines", stats.lines_read);
    } else {
        log::debug!("feeder reached end of input after {} lines", stats.lines_read);
    }
    Ok(stats)
}
