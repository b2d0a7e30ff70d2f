//! Concurrent record writer backed by a bounded worker pool.

use crate::destination::Destination;
use crate::error::PopulateError;
use crate::metrics::{WriteCounters, WriteStats};
use loadtest_generator::Record;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Dispatches each record of a batch as its own write.
///
/// At most `threads` writes are in flight at once. `ingest` returns as soon as
/// every record of the batch has been handed to a worker; completion is
/// observed through the write counters and by `close`, which drains all
/// outstanding writes before releasing the destination.
pub struct AsyncBulkSender<D: Destination> {
    destination: Arc<D>,
    workers: Arc<Semaphore>,
    in_flight: JoinSet<()>,
    counters: Arc<WriteCounters>,
    threads: usize,
}

impl<D: Destination> AsyncBulkSender<D> {
    /// Create a sender with a pool of `threads` concurrent writers.
    pub fn new(destination: D, threads: usize) -> Result<Self, PopulateError> {
        if threads == 0 {
            return Err(PopulateError::Config(
                "worker pool size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            destination: Arc::new(destination),
            workers: Arc::new(Semaphore::new(threads)),
            in_flight: JoinSet::new(),
            counters: Arc::new(WriteCounters::default()),
            threads,
        })
    }

    /// Size of the worker pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Current write outcome counters.
    pub fn stats(&self) -> WriteStats {
        self.counters.snapshot()
    }

    /// Submit every record in `batch` for writing.
    ///
    /// Waits only for a free worker slot per record, never for the writes
    /// themselves. Returns the number of records submitted.
    pub async fn ingest<I>(&mut self, batch: I) -> Result<u64, PopulateError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut submitted = 0u64;

        for record in batch {
            let permit = Arc::clone(&self.workers)
                .acquire_owned()
                .await
                .map_err(|_| PopulateError::SenderClosed)?;
            let destination = Arc::clone(&self.destination);
            let counters = Arc::clone(&self.counters);

            counters.submitted();
            self.in_flight.spawn(async move {
                let id = record.id;
                match destination.write_record(record).await {
                    Ok(()) => counters.acknowledged(),
                    Err(e) => {
                        counters.failed();
                        warn!("Write of record {} failed: {}", id, e);
                    }
                }
                drop(permit);
            });
            submitted += 1;
        }

        self.reap_finished();
        debug!("Submitted batch of {} records", submitted);
        Ok(submitted)
    }

    /// Drop handles of writes that already completed.
    fn reap_finished(&mut self) {
        while let Some(result) = self.in_flight.try_join_next() {
            if let Err(e) = result {
                warn!("Write task did not complete: {}", e);
            }
        }
    }

    /// Wait for all outstanding writes, then release the destination.
    pub async fn close(mut self) -> WriteStats {
        let pending = self.in_flight.len();
        if pending > 0 {
            info!("Draining {} in-flight writes", pending);
        }

        while let Some(result) = self.in_flight.join_next().await {
            if let Err(e) = result {
                warn!("Write task did not complete: {}", e);
            }
        }

        self.workers.close();
        self.destination.close().await;

        let stats = self.counters.snapshot();
        debug!(
            "Sender closed: {} submitted, {} acknowledged, {} failed",
            stats.submitted, stats.acknowledged, stats.failed
        );
        stats
    }
}
