//! Progress and result metrics for send sessions.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Observed send rate at a flush boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SendProgress {
    /// Records emitted so far
    pub sent: u64,
    /// `sent / elapsed` in records per second
    pub rate: f64,
}

impl fmt::Display for SendProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:.0}", self.sent, self.rate)
    }
}

/// Snapshot of write outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    /// Writes handed to the worker pool
    pub submitted: u64,
    /// Writes the destination acknowledged
    pub acknowledged: u64,
    /// Writes that failed
    pub failed: u64,
}

impl WriteStats {
    /// Writes submitted but not yet completed.
    pub fn in_flight(&self) -> u64 {
        self.submitted
            .saturating_sub(self.acknowledged)
            .saturating_sub(self.failed)
    }
}

/// Shared counters updated by sender workers.
#[derive(Debug, Default)]
pub(crate) struct WriteCounters {
    submitted: AtomicU64,
    acknowledged: AtomicU64,
    failed: AtomicU64,
}

impl WriteCounters {
    pub(crate) fn submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> WriteStats {
        WriteStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            acknowledged: self.acknowledged.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Result of a completed send session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendReport {
    /// Records emitted by the pacing loop
    pub sent: u64,
    /// Wall-clock time from first emission to sender close
    pub elapsed: Duration,
    /// Number of batches flushed to the sender
    pub batch_count: u64,
    /// Write outcomes after the sender drained
    pub writes: WriteStats,
    /// Whether the session stopped early on cancellation
    pub cancelled: bool,
}

impl SendReport {
    /// Achieved send rate in records per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.sent as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Final `sent,rate` progress line.
    pub fn final_progress(&self) -> SendProgress {
        SendProgress {
            sent: self.sent,
            rate: self.rows_per_second(),
        }
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Sent {} records in {:?} ({:.2} records/sec)\n\
             Batches: {}\n\
             Writes: {} submitted, {} acknowledged, {} failed",
            self.sent,
            self.elapsed,
            self.rows_per_second(),
            self.batch_count,
            self.writes.submitted,
            self.writes.acknowledged,
            self.writes.failed,
        )
    }
}
