//! Destination abstraction and the in-memory destination used for dry runs.

use crate::error::WriteError;
use async_trait::async_trait;
use loadtest_generator::Record;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A store that records can be written to.
///
/// Implementations must tolerate many concurrent `write_record` calls; the
/// sender shares one destination across its whole worker pool.
#[async_trait]
pub trait Destination: Send + Sync + 'static {
    /// Write one record.
    async fn write_record(&self, record: Record) -> Result<(), WriteError>;

    /// Release the connection. Errors during shutdown are swallowed.
    async fn close(&self);
}

/// Destination that keeps writes in memory.
///
/// Used by `--dry-run` and by tests. Ids are only retained when capture is
/// enabled, so long dry runs stay constant in memory.
#[derive(Default)]
pub struct MemoryDestination {
    written: AtomicU64,
    closed: AtomicBool,
    latency: Option<Duration>,
    captured: Option<Mutex<Vec<Uuid>>>,
}

impl MemoryDestination {
    /// Create an empty in-memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay each write by `latency` to mimic a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Retain the id of every written record.
    pub fn with_capture(mut self) -> Self {
        self.captured = Some(Mutex::new(Vec::new()));
        self
    }

    /// Number of records written so far.
    pub fn count(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Ids of written records in completion order (empty unless capturing).
    pub async fn captured_ids(&self) -> Vec<Uuid> {
        match &self.captured {
            Some(ids) => ids.lock().await.clone(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn write_record(&self, record: Record) -> Result<(), WriteError> {
        if self.is_closed() {
            return Err(WriteError::Closed);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(ids) = &self.captured {
            ids.lock().await.push(record.id);
        }
        self.written.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[async_trait]
impl<D: Destination> Destination for std::sync::Arc<D> {
    async fn write_record(&self, record: Record) -> Result<(), WriteError> {
        self.as_ref().write_record(record).await
    }

    async fn close(&self) {
        self.as_ref().close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_generator::{SampleSet, SampleSource};

    #[tokio::test]
    async fn test_memory_destination_counts_writes() {
        let dest = MemoryDestination::new();
        let mut source = SampleSource::new(SampleSet::builtin().unwrap());

        for _ in 0..5 {
            dest.write_record(source.next_record()).await.unwrap();
        }

        assert_eq!(dest.count(), 5);
        assert!(dest.captured_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_destination_capture() {
        let dest = MemoryDestination::new().with_capture();
        let mut source = SampleSource::new(SampleSet::builtin().unwrap());
        let record = source.next_record();
        let id = record.id;

        dest.write_record(record).await.unwrap();

        assert_eq!(dest.captured_ids().await, vec![id]);
    }

    #[tokio::test]
    async fn test_memory_destination_rejects_after_close() {
        let dest = MemoryDestination::new();
        let mut source = SampleSource::new(SampleSet::builtin().unwrap());

        dest.close().await;
        let result = dest.write_record(source.next_record()).await;

        assert!(matches!(result, Err(WriteError::Closed)));
        assert_eq!(dest.count(), 0);
    }
}
