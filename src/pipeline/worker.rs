//! Batch worker
//!
//! A worker pops raw lines, parses them into a local buffer and flushes the
//! buffer once it holds `batch_size` records. A flush merges the batch into
//! the shared aggregator and then commits it to the store. A flush failure
//! stops the whole pipeline. Records a worker has taken but drops on shutdown
//! are counted as abandoned work.

use std::sync::Arc;

use crate::aggregator::{BatchDelta, UserLockRegistry};
use crate::core::shutdown::CancellationSignal;
use crate::queue::QueueConsumer;
use crate::record::{parse_raw_line, TransactionRecord};
use crate::store::{AnalyticsStore, StoreError};

use super::error::{FlushError, PipelineError};
use super::summary::PipelineCounters;

/// Everything a worker shares with its peers
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) store: Arc<dyn AnalyticsStore>,
    pub(crate) registry: Arc<UserLockRegistry>,
    pub(crate) counters: Arc<PipelineCounters>,
    pub(crate) shutdown: CancellationSignal,
    pub(crate) batch_size: usize,
}

pub(crate) struct Worker {
    id: usize,
    consumer: QueueConsumer,
    ctx: WorkerContext,
    buffer: Vec<TransactionRecord>,
}

impl Worker {
    pub(crate) fn new(id: usize, consumer: QueueConsumer, ctx: WorkerContext) -> Self {
        let batch_size = ctx.batch_size.max(1);
        Self {
            id,
            consumer,
            ctx: WorkerContext { batch_size, ..ctx },
            buffer: Vec::with_capacity(batch_size),
        }
    }

    /// Drain the queue until it closes or shutdown is requested
    ///
    /// On failure the shared shutdown signal is triggered before returning,
    /// so every peer stops at its next safe point.
    pub(crate) async fn run(mut self) -> Result<(), PipelineError> {
        log::debug!("worker {} started", self.id);
        let result = self.process().await;

        match &result {
            Ok(()) => log::debug!("worker {} finished", self.id),
            Err(e) => {
                log::error!("worker {} failed: {}", self.id, e);
                self.ctx.shutdown.trigger();
            }
        }
        result
    }

    async fn process(&mut self) -> Result<(), PipelineError> {
        loop {
            if self.ctx.shutdown.is_cancelled() {
                let queued = self.consumer.len();
                if !self.buffer.is_empty() || queued > 0 {
                    log::warn!(
                        "worker {} stopping: {} unflushed record(s) abandoned, {} line(s) left queued",
                        self.id,
                        self.buffer.len(),
                        queued
                    );
                    self.ctx.counters.work_abandoned();
                }
                return Ok(());
            }

            let popped = tokio::select! {
                biased;
                _ = self.ctx.shutdown.cancelled() => continue,
                line = self.consumer.pop() => line,
            };

            let Some(line) = popped else {
                // Queue closed and drained
                return self.flush().await;
            };

            match parse_raw_line(&line) {
                Ok(record) => self.buffer.push(record),
                Err(e) => {
                    log::warn!("worker {}: skipping line: {}", self.id, e);
                    self.ctx.counters.record_skipped();
                    continue;
                }
            }

            if self.buffer.len() >= self.ctx.batch_size {
                self.flush().await?;
            }
        }
    }

    async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let records = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.ctx.batch_size));
        let delta = BatchDelta::from_records(&records);
        let flush_error = |source: FlushError| PipelineError::Flush {
            worker: self.id,
            source,
        };

        self.ctx
            .registry
            .merge(&delta)
            .map_err(|e| flush_error(e.into()))?;

        match self.ctx.store.apply_batch(&delta, &self.ctx.shutdown).await {
            Ok(()) => {
                self.ctx
                    .counters
                    .batch_committed(records.len(), delta.iter().map(|(user, _)| user));
                log::debug!(
                    "worker {} committed {} record(s) for {} user(s)",
                    self.id,
                    records.len(),
                    delta.len()
                );
                Ok(())
            }
            Err(StoreError::Cancelled) => {
                log::warn!(
                    "worker {}: batch of {} record(s) abandoned, shutdown requested",
                    self.id,
                    records.len()
                );
                self.ctx.counters.work_abandoned();
                Ok(())
            }
            Err(e) => Err(flush_error(e.into())),
        }
    }
}
