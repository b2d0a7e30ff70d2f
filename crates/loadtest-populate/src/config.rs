//! Configuration for a send session.

use crate::error::PopulateError;
use crate::rate::Pacing;

/// Default number of concurrent writers.
pub const DEFAULT_THREADS: usize = 8;

/// Configuration for a send session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendConfig {
    /// Requested records per second.
    pub target_rate: u64,
    /// Total records to send.
    pub num_to_send: u64,
    /// Milliseconds between bursts; 0 selects continuous pacing.
    pub burst_delay_ms: u64,
    /// Worker pool size for concurrent writes.
    pub threads: usize,
    /// Records per flushed batch; defaults to `target_rate`.
    pub flush_every: Option<u64>,
}

impl SendConfig {
    /// Create a continuous-pacing configuration.
    pub fn new(target_rate: u64, num_to_send: u64) -> Self {
        Self {
            target_rate,
            num_to_send,
            burst_delay_ms: 0,
            threads: DEFAULT_THREADS,
            flush_every: None,
        }
    }

    /// Send in bursts separated by `delay_ms` (0 = continuous).
    pub fn with_burst_delay_ms(mut self, delay_ms: u64) -> Self {
        self.burst_delay_ms = delay_ms;
        self
    }

    /// Set the worker pool size.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Flush a batch every `records` records instead of every `target_rate`.
    pub fn with_flush_every(mut self, records: u64) -> Self {
        self.flush_every = Some(records);
        self
    }

    /// Pacing mode implied by the burst delay.
    pub fn pacing(&self) -> Pacing {
        Pacing::from_burst_delay_ms(self.burst_delay_ms)
    }

    /// Records per flushed batch.
    pub fn flush_interval(&self) -> u64 {
        self.flush_every.unwrap_or(self.target_rate)
    }

    /// Check the configuration before anything is sent.
    pub fn validate(&self) -> Result<(), PopulateError> {
        if self.target_rate == 0 {
            return Err(PopulateError::Config(
                "rate must be greater than 0".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(PopulateError::Config(
                "threads must be greater than 0".to_string(),
            ));
        }
        if self.flush_interval() == 0 {
            return Err(PopulateError::Config(
                "flush interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
