//! Send session orchestration.

use crate::config::SendConfig;
use crate::destination::Destination;
use crate::error::PopulateError;
use crate::metrics::{SendProgress, SendReport};
use crate::rate::{Pacing, RateController};
use crate::sender::AsyncBulkSender;
use loadtest_generator::{Record, SampleSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type ProgressFn = Box<dyn FnMut(&SendProgress) + Send>;

/// Upper bound on the batch buffer reserved up front; larger batches grow on demand.
const MAX_INITIAL_BATCH: u64 = 4096;

/// Pulls records from a `SampleSource`, paces them with a `RateController`
/// and flushes them in batches through an `AsyncBulkSender`.
///
/// The session owns the batch buffer; records move into the sender at each
/// flush and the buffer is reused.
pub struct SendSession<D: Destination> {
    config: SendConfig,
    source: SampleSource,
    controller: RateController,
    sender: AsyncBulkSender<D>,
    batch: Vec<Record>,
    batch_count: u64,
    on_progress: Option<ProgressFn>,
    cancel: CancellationToken,
}

impl<D: Destination> SendSession<D> {
    /// Create a session. The configuration is validated before anything
    /// touches the destination.
    pub fn new(
        config: SendConfig,
        source: SampleSource,
        destination: D,
    ) -> Result<Self, PopulateError> {
        config.validate()?;

        let controller = RateController::new(config.target_rate, config.pacing())?;
        let sender = AsyncBulkSender::new(destination, config.threads)?;
        let capacity = config
            .flush_interval()
            .min(config.num_to_send.max(1))
            .min(MAX_INITIAL_BATCH) as usize;

        Ok(Self {
            config,
            source,
            controller,
            sender,
            batch: Vec::with_capacity(capacity),
            batch_count: 0,
            on_progress: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Invoke `f` with the observed rate at every flush boundary.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(&SendProgress) + Send + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Stop sending when `token` is cancelled. Submitted writes still drain.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run until `num_to_send` records are sent or the session is cancelled.
    pub async fn run(mut self) -> Result<SendReport, PopulateError> {
        let num_to_send = self.config.num_to_send;
        let flush_every = self.config.flush_interval();

        info!(
            "Sending {} records at {}/s ({:?}, {} writers, flush every {})",
            num_to_send,
            self.config.target_rate,
            self.controller.pacing(),
            self.sender.threads(),
            flush_every
        );

        self.controller.start();
        let mut sent = 0u64;
        let mut cancelled = false;

        'send: while sent < num_to_send {
            let burst = match self.controller.pacing() {
                Pacing::Continuous => 1,
                Pacing::Burst { .. } => {
                    tokio::select! {
                        burst = self.controller.wait_for_burst() => burst,
                        _ = self.cancel.cancelled() => {
                            cancelled = true;
                            break 'send;
                        }
                    }
                }
            };

            for _ in 0..burst {
                if sent >= num_to_send {
                    break 'send;
                }
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break 'send;
                }
                if sent > 0 && sent % flush_every == 0 {
                    self.flush().await?;
                    self.report(sent);
                }

                self.batch.push(self.source.next_record());
                sent += 1;
                self.controller.record_sent();

                if self.controller.pacing() == Pacing::Continuous {
                    tokio::select! {
                        _ = self.controller.pace() => {}
                        _ = self.cancel.cancelled() => {
                            cancelled = true;
                            break 'send;
                        }
                    }
                }
            }
        }

        if !self.batch.is_empty() {
            self.flush().await?;
        }

        let batch_count = self.batch_count;
        let writes = self.sender.close().await;
        let report = SendReport {
            sent,
            elapsed: self.controller.elapsed(),
            batch_count,
            writes,
            cancelled,
        };

        if cancelled {
            info!("Send cancelled after {} records", sent);
        }
        info!(
            "Send complete: {} records in {:?} ({:.2} records/sec)",
            report.sent,
            report.elapsed,
            report.rows_per_second()
        );

        Ok(report)
    }

    async fn flush(&mut self) -> Result<(), PopulateError> {
        let submitted = self.sender.ingest(self.batch.drain(..)).await?;
        self.batch_count += 1;
        debug!("Flushed batch {} ({} records)", self.batch_count, submitted);
        Ok(())
    }

    fn report(&mut self, sent: u64) {
        let progress = SendProgress {
            sent,
            rate: self.controller.observed_rate(),
        };
        info!("Progress: {} sent, {:.0} records/sec", progress.sent, progress.rate);
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(&progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::MemoryDestination;
    use loadtest_generator::SampleSet;
    use std::sync::{Arc, Mutex};

    fn source() -> SampleSource {
        SampleSource::new(SampleSet::builtin().unwrap())
    }

    #[test]
    fn test_invalid_config_fails_before_sending() {
        let dest = Arc::new(MemoryDestination::new());
        let result = SendSession::new(SendConfig::new(0, 10), source(), Arc::clone(&dest));

        assert!(matches!(result, Err(PopulateError::Config(_))));
        assert_eq!(dest.count(), 0);
    }

    #[test]
    fn test_huge_flush_interval_reserves_bounded_buffer() {
        let config = SendConfig::new(100_000_000, 1_000_000_000);
        let session = SendSession::new(config, source(), MemoryDestination::new()).unwrap();

        assert!(session.batch.capacity() >= 1);
        assert!(session.batch.capacity() < 2 * MAX_INITIAL_BATCH as usize);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_session_reports_each_flush() {
        let dest = Arc::new(MemoryDestination::new());
        let progress = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&progress);

        let report = SendSession::new(SendConfig::new(100, 350), source(), Arc::clone(&dest))
            .unwrap()
            .with_progress(move |p| seen.lock().unwrap().push(p.sent))
            .run()
            .await
            .unwrap();

        assert_eq!(report.sent, 350);
        assert_eq!(report.batch_count, 4);
        assert_eq!(report.writes.acknowledged, 350);
        assert_eq!(dest.count(), 350);
        assert!(dest.is_closed());
        assert_eq!(*progress.lock().unwrap(), vec![100, 200, 300]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_session_stops_mid_burst() {
        let dest = Arc::new(MemoryDestination::new());

        let config = SendConfig::new(1000, 250).with_burst_delay_ms(100);
        let report = SendSession::new(config, source(), Arc::clone(&dest))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.sent, 250);
        assert_eq!(dest.count(), 250);
        // Three bursts of 100, 100 and 50 records, each after a ~100ms wait.
        let rate = report.rows_per_second();
        assert!((700.0..=900.0).contains(&rate), "rate was {rate}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_records_sends_nothing() {
        let dest = Arc::new(MemoryDestination::new());

        let report = SendSession::new(SendConfig::new(10, 0), source(), Arc::clone(&dest))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.sent, 0);
        assert_eq!(report.batch_count, 0);
        assert!(dest.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drains_submitted_writes() {
        let dest = Arc::new(MemoryDestination::new());
        let token = CancellationToken::new();
        let trigger = token.clone();

        let session = SendSession::new(SendConfig::new(100, 10_000), source(), Arc::clone(&dest))
            .unwrap()
            .with_cancellation(token);

        let handle = tokio::spawn(session.run());
        tokio::time::sleep(std::time::Duration::from_millis(2_505)).await;
        trigger.cancel();

        let report = handle.await.unwrap().unwrap();

        assert!(report.cancelled);
        assert!(report.sent > 0 && report.sent < 10_000);
        assert_eq!(report.writes.acknowledged, report.sent);
        assert_eq!(dest.count(), report.sent);
    }
}
