//! Worker pool and run orchestration

use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncBufRead;
use tokio::task::JoinSet;

use crate::aggregator::UserLockRegistry;
use crate::core::shutdown::CancellationSignal;
use crate::queue::ingest_queue;
use crate::store::AnalyticsStore;

use super::error::PipelineError;
use super::feeder::{feed_lines, FeedStats};
use super::summary::{IngestSummary, PipelineCounters, RunOutcome};
use super::worker::{Worker, WorkerContext};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Sizing of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub workers: usize,
    pub batch_size: usize,
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Result of a pipeline run: the summary plus the first error, if any
#[derive(Debug)]
pub struct IngestReport {
    pub summary: IngestSummary,
    pub error: Option<PipelineError>,
}

impl IngestReport {
    pub fn outcome(&self) -> RunOutcome {
        self.summary.outcome
    }

    pub fn exit_code(&self) -> i32 {
        self.summary.outcome.exit_code()
    }
}

/// The ingestion pipeline: one feeder, `workers` workers, one shared registry
pub struct IngestPipeline {
    config: PipelineConfig,
    registry: Arc<UserLockRegistry>,
}

impl IngestPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            registry: Arc::new(UserLockRegistry::new()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// In-memory running totals of every user seen so far
    pub fn registry(&self) -> &Arc<UserLockRegistry> {
        &self.registry
    }

    /// Ingest `reader` to completion, shutdown or failure
    ///
    /// Never panics and never returns early: every worker is awaited before
    /// the report is built. The first failure triggers `shutdown` so the
    /// remaining workers stop promptly.
    pub async fn run<R>(
        &self,
        reader: R,
        store: Arc<dyn AnalyticsStore>,
        shutdown: CancellationSignal,
    ) -> IngestReport
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let started = Instant::now();
        let counters = Arc::new(PipelineCounters::default());

        let (publisher, consumer) = match ingest_queue(self.config.queue_capacity) {
            Ok(queue) => queue,
            Err(e) => {
                return self.report(&counters, FeedStats::default(), started, Some(e.into()))
            }
        };

        let workers = self.config.workers.max(1);
        log::info!(
            "ingestion started: {} worker(s), batch size {}, queue capacity {}",
            workers,
            self.config.batch_size,
            self.config.queue_capacity
        );

        let ctx = WorkerContext {
            store,
            registry: Arc::clone(&self.registry),
            counters: Arc::clone(&counters),
            shutdown: shutdown.clone(),
            batch_size: self.config.batch_size,
        };
        let mut tasks = JoinSet::new();
        for id in 0..workers {
            tasks.spawn(Worker::new(id, consumer.clone(), ctx.clone()).run());
        }
        // Only the workers hold consumers now
        drop(consumer);

        let feeder = tokio::spawn(feed_lines(reader, publisher, shutdown.clone()));

        let mut first_error: Option<PipelineError> = None;
        let mut record_error = |error: PipelineError, shutdown: &CancellationSignal| {
            if first_error.is_none() {
                first_error = Some(error);
            }
            shutdown.trigger();
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => record_error(e, &shutdown),
                Err(e) => record_error(
                    PipelineError::WorkerPanicked {
                        message: e.to_string(),
                    },
                    &shutdown,
                ),
            }
        }

        let feed_stats = match feeder.await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                log::error!("input failed: {}", e);
                let stats = FeedStats {
                    lines_read: e.lines_read(),
                    interrupted: true,
                };
                record_error(e.into(), &shutdown);
                stats
            }
            Err(e) => {
                record_error(
                    PipelineError::WorkerPanicked {
                        message: format!("feeder: {}", e),
                    },
                    &shutdown,
                );
                FeedStats::default()
            }
        };

        self.report(&counters, feed_stats, started, first_error)
    }

    fn report(
        &self,
        counters: &PipelineCounters,
        feed_stats: FeedStats,
        started: Instant,
        error: Option<PipelineError>,
    ) -> IngestReport {
        let outcome = run_outcome(error.is_some(), feed_stats, counters.abandonments());

        let summary = IngestSummary {
            lines_read: feed_stats.lines_read,
            records_processed: counters.records_processed(),
            records_skipped: counters.records_skipped(),
            batches_committed: counters.batches_committed(),
            unique_users: counters.committed_users(),
            elapsed: started.elapsed(),
            outcome,
        };

        log::info!(
            "ingestion {}: {} processed, {} skipped, {} batch(es) in {:.2?}",
            outcome,
            summary.records_processed,
            summary.records_skipped,
            summary.batches_committed,
            summary.elapsed
        );

        IngestReport { summary, error }
    }
}

/// A run is interrupted only when input or taken records were left behind;
/// a shutdown request that arrives after everything committed changes nothing
fn run_outcome(failed: bool, feed_stats: FeedStats, abandonments: u64) -> RunOutcome {
    if failed {
        RunOutcome::Failed
    } else if feed_stats.interrupted || abandonments > 0 {
        RunOutcome::Interrupted
    } else {
        RunOutcome::Completed
    }
}
