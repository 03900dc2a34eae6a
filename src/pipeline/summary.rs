//! Run summary and shared counters

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use strum_macros::Display;

use crate::core::shutdown::INTERRUPTED_EXIT_CODE;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// The input drained and every batch was committed
    Completed,
    /// The feeder stopped before the end of input, or a worker abandoned
    /// records it had already taken
    Interrupted,
    /// A worker or the feeder failed
    Failed,
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Interrupted => INTERRUPTED_EXIT_CODE,
            RunOutcome::Failed => 1,
        }
    }
}

/// What a pipeline run achieved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub lines_read: u64,
    /// Records in committed batches
    pub records_processed: u64,
    /// Lines that failed to parse
    pub records_skipped: u64,
    pub batches_committed: u64,
    /// Distinct users with at least one committed order in this run
    pub unique_users: usize,
    pub elapsed: Duration,
    pub outcome: RunOutcome,
}

impl IngestSummary {
    /// Committed records per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Counters shared by all workers of one run
#[derive(Debug, Default)]
pub(crate) struct PipelineCounters {
    records_processed: AtomicU64,
    records_skipped: AtomicU64,
    batches_committed: AtomicU64,
    /// Times a worker dropped records it had taken off the queue
    abandonments: AtomicU64,
    committed_users: Mutex<HashSet<String>>,
}

impl PipelineCounters {
    pub(crate) fn record_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn batch_committed<'a>(
        &self,
        records: usize,
        users: impl IntoIterator<Item = &'a String>,
    ) {
        self.records_processed
            .fetch_add(records as u64, Ordering::Relaxed);
        self.batches_committed.fetch_add(1, Ordering::Relaxed);

        let mut committed = self
            .committed_users
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for user in users {
            if !committed.contains(user) {
                committed.insert(user.clone());
            }
        }
    }

    pub(crate) fn work_abandoned(&self) {
        self.abandonments.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn abandonments(&self) -> u64 {
        self.abandonments.load(Ordering::Relaxed)
    }

    pub(crate) fn committed_users(&self) -> usize {
        self.committed_users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn records_processed(&self) -> u64 {
        self.records_processed.load(Ordering::Relaxed)
    }

    pub(crate) fn records_skipped(&self) -> u64 {
        self.records_skipped.load(Ordering::Relaxed)
    }

    pub(crate) fn batches_committed(&self) -> u64 {
        self.batches_committed.load(Ordering::Relaxed)
    }
}
