//! Send pacing with proportional rate correction.
//!
//! Two pacing modes are supported:
//!
//! - **Continuous**: one record every `1e9 / rate` nanoseconds. Every `rate`
//!   records, and every 1000 records, the observed rate is compared with the
//!   target and the delay is nudged by `(target - observed) / target * target` nanoseconds.
//! - **Burst**: `round(rate / 1000 * burst_delay_ms)` records back-to-back,
//!   then a sleep of `burst_delay_ms`. The sleep is corrected before every burst
//!   by the same proportional term, scaled to milliseconds.
//!
//! Neither mode integrates error over time; overshoot is damped by later
//! correction windows.

use crate::error::PopulateError;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Number of records between continuous-mode corrections.
pub const CORRECTION_INTERVAL: u64 = 1000;

/// Maximum lag behind schedule that continuous mode will catch up on.
const MAX_CATCH_UP: Duration = Duration::from_millis(100);

/// How records are spaced in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Evenly spaced records.
    Continuous,
    /// Groups of records separated by a sleep of `delay_ms`.
    Burst { delay_ms: u64 },
}

impl Pacing {
    /// Burst delay of zero means continuous pacing.
    pub fn from_burst_delay_ms(delay_ms: u64) -> Self {
        if delay_ms == 0 {
            Pacing::Continuous
        } else {
            Pacing::Burst { delay_ms }
        }
    }
}

/// Computes and re-tunes the delay between records (or bursts).
#[derive(Debug)]
pub struct RateController {
    /// Requested records per second
    target_rate: u64,
    pacing: Pacing,
    /// Nanoseconds between records (continuous) or milliseconds between bursts (burst)
    current_delay: u64,
    /// Last correction applied to `current_delay`
    tweak: i64,
    /// Records per burst (1 in continuous mode)
    records_per_burst: u64,
    /// Start of the measurement window
    window_start: Instant,
    /// Records sent since `window_start`
    sent_in_window: u64,
    /// Next scheduled emission time (continuous mode)
    deadline: Instant,
}

impl RateController {
    /// Create a controller for `target_rate` records per second.
    pub fn new(target_rate: u64, pacing: Pacing) -> Result<Self, PopulateError> {
        if target_rate == 0 {
            return Err(PopulateError::Config(
                "target rate must be greater than 0".to_string(),
            ));
        }

        let (current_delay, records_per_burst) = match pacing {
            Pacing::Continuous => (1_000_000_000 / target_rate, 1),
            Pacing::Burst { delay_ms } => {
                let per_burst = (target_rate as f64 / 1000.0 * delay_ms as f64).round() as u64;
                (delay_ms, per_burst.max(1))
            }
        };

        let now = Instant::now();
        Ok(Self {
            target_rate,
            pacing,
            current_delay,
            tweak: 0,
            records_per_burst,
            window_start: now,
            sent_in_window: 0,
            deadline: now,
        })
    }

    /// Reset the measurement window and schedule to now.
    pub fn start(&mut self) {
        let now = Instant::now();
        self.window_start = now;
        self.deadline = now;
        self.sent_in_window = 0;
    }

    pub fn target_rate(&self) -> u64 {
        self.target_rate
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Current delay: nanoseconds in continuous mode, milliseconds in burst mode.
    pub fn current_delay(&self) -> u64 {
        self.current_delay
    }

    /// Last correction applied.
    pub fn tweak(&self) -> i64 {
        self.tweak
    }

    pub fn records_per_burst(&self) -> u64 {
        self.records_per_burst
    }

    pub fn sent_in_window(&self) -> u64 {
        self.sent_in_window
    }

    /// Time since the window started.
    pub fn elapsed(&self) -> Duration {
        self.window_start.elapsed()
    }

    /// Observed records per second since the window started.
    pub fn observed_rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.sent_in_window as f64 / secs
        } else {
            0.0
        }
    }

    /// Proportional correction for the current observed rate.
    ///
    /// An empty window observes zero, so the first burst wait is already
    /// shortened by the full target.
    fn correction(&self) -> i64 {
        let target = self.target_rate as f64;
        let rate_diff = (target - self.observed_rate()) / target;
        (rate_diff * target) as i64
    }

    /// Count one emitted record.
    ///
    /// In continuous mode this re-tunes the delay every `target_rate` records
    /// and every `CORRECTION_INTERVAL` records.
    pub fn record_sent(&mut self) {
        self.sent_in_window += 1;

        let sent = self.sent_in_window;
        if self.pacing == Pacing::Continuous
            && (sent % CORRECTION_INTERVAL == 0 || sent % self.target_rate == 0)
        {
            self.tweak = self.correction();
            self.current_delay = (self.current_delay as i64 - self.tweak).max(0) as u64;
            debug!(
                "Rate correction at {}: observed {:.1}/s, tweak {}ns, delay {}ns",
                self.sent_in_window,
                self.observed_rate(),
                self.tweak,
                self.current_delay
            );
        }
    }

    /// Wait out the inter-record delay (continuous mode).
    ///
    /// Deadlines are absolute so timer granularity does not accumulate, but
    /// lag beyond `MAX_CATCH_UP` is forgiven rather than sent as a burst.
    pub async fn pace(&mut self) {
        let now = Instant::now();
        if let Some(floor) = now.checked_sub(MAX_CATCH_UP) {
            if self.deadline < floor {
                self.deadline = floor;
            }
        }
        self.deadline += Duration::from_nanos(self.current_delay);
        tokio::time::sleep_until(self.deadline).await;
    }

    /// Re-tune and sleep the inter-burst delay, returning the burst size.
    pub async fn wait_for_burst(&mut self) -> u64 {
        self.tweak = self.correction();
        let adjusted = self.current_delay as i64 - (self.tweak as f64 / 1000.0).round() as i64;

        if adjusted <= 0 {
            self.current_delay = 0;
        } else {
            self.current_delay = adjusted as u64;
            tokio::time::sleep(Duration::from_millis(self.current_delay)).await;
        }

        self.records_per_burst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_rejected() {
        let result = RateController::new(0, Pacing::Continuous);
        assert!(matches!(result, Err(PopulateError::Config(_))));
    }

    #[test]
    fn test_continuous_initial_delay() {
        let controller = RateController::new(100, Pacing::Continuous).unwrap();
        assert_eq!(controller.current_delay(), 10_000_000);
        assert_eq!(controller.records_per_burst(), 1);
    }

    #[test]
    fn test_burst_size() {
        let controller = RateController::new(5000, Pacing::Burst { delay_ms: 100 }).unwrap();
        assert_eq!(controller.records_per_burst(), 500);
        assert_eq!(controller.current_delay(), 100);
    }

    #[test]
    fn test_burst_size_minimum_one() {
        let controller = RateController::new(1, Pacing::Burst { delay_ms: 10 }).unwrap();
        assert_eq!(controller.records_per_burst(), 1);
    }

    #[test]
    fn test_pacing_from_burst_delay() {
        assert_eq!(Pacing::from_burst_delay_ms(0), Pacing::Continuous);
        assert_eq!(
            Pacing::from_burst_delay_ms(250),
            Pacing::Burst { delay_ms: 250 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_pacing_hits_target() {
        let mut controller = RateController::new(100, Pacing::Continuous).unwrap();
        controller.start();

        for _ in 0..1000 {
            controller.record_sent();
            controller.pace().await;
        }

        let rate = controller.observed_rate();
        assert!((90.0..=110.0).contains(&rate), "rate was {rate}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sender_shortens_delay() {
        let mut controller = RateController::new(1000, Pacing::Continuous).unwrap();
        controller.start();

        // Every record takes 2ms of "work" on top of pacing, so the
        // observed rate sits well below target at the first correction.
        for _ in 0..CORRECTION_INTERVAL {
            tokio::time::sleep(Duration::from_millis(2)).await;
            controller.record_sent();
        }

        assert!(controller.tweak() > 0);
        assert!(controller.current_delay() < 1_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_correction_every_target_rate_records() {
        let mut controller = RateController::new(100, Pacing::Continuous).unwrap();
        controller.start();

        // 20ms per record is half the target rate.
        for _ in 0..99 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            controller.record_sent();
        }
        assert_eq!(controller.tweak(), 0);
        assert_eq!(controller.current_delay(), 10_000_000);

        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.record_sent();

        // Well before CORRECTION_INTERVAL.
        assert_eq!(controller.sent_in_window(), 100);
        assert!(controller.tweak() > 0, "tweak {}", controller.tweak());
        assert!(controller.current_delay() < 10_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_first_wait_is_corrected() {
        let mut controller = RateController::new(1000, Pacing::Burst { delay_ms: 50 }).unwrap();
        controller.start();

        let before = Instant::now();
        let burst = controller.wait_for_burst().await;

        // Nothing sent yet: the tweak is the whole target, 1ms at this rate.
        assert_eq!(burst, 50);
        assert_eq!(controller.tweak(), 1000);
        assert_eq!(controller.current_delay(), 49);
        let waited = before.elapsed();
        assert!(
            waited >= Duration::from_millis(49) && waited < Duration::from_millis(51),
            "waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_delay_clamped_at_zero() {
        let mut controller = RateController::new(100_000, Pacing::Burst { delay_ms: 1 }).unwrap();
        controller.start();

        // One record in a full second is far behind a 100k/s target.
        controller.record_sent();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let before = Instant::now();
        controller.wait_for_burst().await;

        assert_eq!(controller.current_delay(), 0);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
