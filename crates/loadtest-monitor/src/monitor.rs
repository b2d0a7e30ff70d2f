//! Periodic poll loop driving a [`MonitorSession`].

use crate::report::MonitorReport;
use crate::session::MonitorSession;
use crate::source::CountSource;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type ReportFn = Box<dyn FnMut(&MonitorReport) + Send>;

/// Totals for one monitor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub ticks: u64,
    pub failed_reads: u64,
    pub reports: u64,
    pub settled_runs: u64,
}

/// Polls a [`CountSource`] on a fixed interval and feeds each count into a
/// [`MonitorSession`].
///
/// Ticks never overlap: a poll that outlasts the interval makes the timer
/// skip the missed ticks. Cancellation is checked between ticks, so a poll in
/// progress always completes.
pub struct ChangeMonitor<S: CountSource> {
    source: S,
    interval: Duration,
    session: MonitorSession,
    on_report: Option<ReportFn>,
    cancel: CancellationToken,
    max_ticks: Option<u64>,
}

impl<S: CountSource> ChangeMonitor<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            session: MonitorSession::new(),
            on_report: None,
            cancel: CancellationToken::new(),
            max_ticks: None,
        }
    }

    /// Invoke `f` for every progress and settled report.
    pub fn with_reporter<F>(mut self, f: F) -> Self
    where
        F: FnMut(&MonitorReport) + Send + 'static,
    {
        self.on_report = Some(Box::new(f));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stop after `ticks` polls instead of running until cancelled.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Poll until cancelled (or `max_ticks` is reached).
    pub async fn run(mut self) -> MonitorStats {
        info!(
            "Monitoring {} every {:?}",
            self.source.name(),
            self.interval
        );

        let mut timer = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = MonitorStats::default();
        let clock = PollClock::start();

        loop {
            if self.max_ticks.is_some_and(|max| stats.ticks >= max) {
                break;
            }
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            stats.ticks += 1;
            self.tick(&clock, &mut stats).await;
        }

        info!(
            "Monitor stopped after {} polls ({} failed, {} settled runs)",
            stats.ticks, stats.failed_reads, stats.settled_runs
        );
        stats
    }

    async fn tick(&mut self, clock: &PollClock, stats: &mut MonitorStats) {
        let count = match self.source.read_count().await {
            Ok(count) => count,
            Err(e) => {
                stats.failed_reads += 1;
                warn!("Failed to read count from {}: {}", self.source.name(), e);
                return;
            }
        };
        let timestamp_ms = clock.now_ms();
        debug!("{} count {} at {}", self.source.name(), count, timestamp_ms);

        if let Some(report) = self.session.observe(timestamp_ms, count) {
            stats.reports += 1;
            if matches!(report, MonitorReport::Settled { .. }) {
                stats.settled_runs += 1;
            }
            if let Some(on_report) = self.on_report.as_mut() {
                on_report(&report);
            }
        }
    }
}

/// Epoch-millisecond timestamps that never go backwards: wall-clock time at
/// start plus monotonic time since.
struct PollClock {
    epoch_ms: i64,
    started: Instant,
}

impl PollClock {
    fn start() -> Self {
        Self {
            epoch_ms: chrono::Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }

    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_ms.saturating_add(elapsed)
    }
}
