//! Count-trend state machine.

use crate::regression::RegressionAccumulator;
use crate::report::{MonitorReport, RateEstimate};
use tracing::{debug, warn};

/// Where the observed count is in its growth cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing observed yet, the count is zero, or the last run has settled.
    Idle,
    /// The count is expected to grow from the current baseline.
    Growing,
    /// A flat poll after growth; the run is being finalized.
    Settling,
}

/// Settled runs need more than this many samples to report a standard error.
const STD_ERR_MIN_SAMPLES: u64 = 5;
/// Settled runs need at least this many samples to report a rate.
const RATE_MIN_SAMPLES: u64 = 2;

/// Per-run monitor state. Every transition is a function of the current state
/// and one `(timestamp, count)` observation.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    phase: Phase,
    previous: Option<(i64, u64)>,
    baseline_count: u64,
    sample_count: u64,
    last_sample_timestamp: Option<i64>,
    regression: RegressionAccumulator,
}

impl Default for MonitorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            previous: None,
            baseline_count: 0,
            sample_count: 0,
            last_sample_timestamp: None,
            regression: RegressionAccumulator::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn baseline_count(&self) -> u64 {
        self.baseline_count
    }

    /// Timestamp of the most recent sample in the current run.
    pub fn last_sample_timestamp(&self) -> Option<i64> {
        self.last_sample_timestamp
    }

    /// Feed one successful poll. `timestamp_ms` must not go backwards.
    pub fn observe(&mut self, timestamp_ms: i64, count: u64) -> Option<MonitorReport> {
        let report = match self.previous {
            Some((_, prev_count)) if count > prev_count => Some(self.grow(timestamp_ms, count)),
            Some((prev_t, prev_count)) if count == prev_count => {
                if self.sample_count > 0 {
                    Some(self.settle(prev_t, prev_count, count))
                } else {
                    self.phase = Phase::Idle;
                    None
                }
            }
            Some((_, prev_count)) => {
                debug!("Count went back from {} to {}, resetting", prev_count, count);
                self.reset(count);
                None
            }
            None => {
                self.reset(count);
                None
            }
        };

        // A settled run forgets its last poll; the next one starts a fresh
        // baseline.
        self.previous = match report {
            Some(MonitorReport::Settled { .. }) => None,
            _ => Some((timestamp_ms, count)),
        };
        report
    }

    fn reset(&mut self, count: u64) {
        self.baseline_count = count;
        self.sample_count = 0;
        self.last_sample_timestamp = None;
        self.regression.clear();
        self.phase = if count == 0 {
            Phase::Idle
        } else {
            Phase::Growing
        };
    }

    fn grow(&mut self, timestamp_ms: i64, count: u64) -> MonitorReport {
        self.phase = Phase::Growing;
        self.regression.add(timestamp_ms as f64, count as f64);
        self.sample_count += 1;
        self.last_sample_timestamp = Some(timestamp_ms);

        let rate = if self.sample_count > 2 {
            self.regression.slope().ok().map(per_second)
        } else {
            None
        };

        MonitorReport::Progress {
            sample_count: self.sample_count,
            timestamp_ms,
            count,
            rate,
        }
    }

    fn settle(&mut self, prev_t: i64, prev_count: u64, count: u64) -> MonitorReport {
        self.phase = Phase::Settling;

        // The flat poll confirms the end of the run; the sample before it is
        // dropped rather than the flat one being added.
        self.sample_count -= 1;
        if let Err(e) = self.regression.remove(prev_t as f64, prev_count as f64) {
            warn!("Could not drop last sample from the fit: {}", e);
        }

        let total_delta = count.saturating_sub(self.baseline_count);
        let sample_count = self.sample_count;
        let estimate = self.estimate();

        debug!(
            "Settled at {} after {} samples ({:?})",
            count, sample_count, estimate
        );

        self.baseline_count = count;
        self.sample_count = 0;
        self.last_sample_timestamp = None;
        self.regression.clear();
        self.phase = Phase::Idle;

        MonitorReport::Settled {
            total_delta,
            sample_count,
            estimate,
        }
    }

    fn estimate(&self) -> RateEstimate {
        if self.sample_count < RATE_MIN_SAMPLES {
            return RateEstimate::Insufficient;
        }

        let rate = match self.regression.slope() {
            Ok(slope) => per_second(slope),
            Err(e) => {
                debug!("No slope for settled run: {}", e);
                return RateEstimate::Insufficient;
            }
        };

        if self.sample_count > STD_ERR_MIN_SAMPLES {
            if let Ok(std_err) = self.regression.slope_std_err() {
                return RateEstimate::WithStdErr {
                    rate,
                    std_err: per_second(std_err),
                };
            }
        }
        RateEstimate::Rate { rate }
    }
}

/// Timestamps are in milliseconds; rates are reported per second.
fn per_second(per_ms: f64) -> f64 {
    per_ms * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(session: &mut MonitorSession, polls: &[(i64, u64)]) -> Vec<Option<MonitorReport>> {
        polls.iter().map(|&(t, c)| session.observe(t, c)).collect()
    }

    #[test]
    fn test_short_run_settles_without_estimate() {
        let mut session = MonitorSession::new();
        let reports = feed(&mut session, &[(0, 0), (1, 0), (2, 5), (3, 10), (4, 10)]);

        assert_eq!(reports[0], None);
        assert_eq!(reports[1], None);
        assert_eq!(
            reports[2],
            Some(MonitorReport::Progress {
                sample_count: 1,
                timestamp_ms: 2,
                count: 5,
                rate: None
            })
        );
        assert_eq!(
            reports[3],
            Some(MonitorReport::Progress {
                sample_count: 2,
                timestamp_ms: 3,
                count: 10,
                rate: None
            })
        );
        assert_eq!(
            reports[4],
            Some(MonitorReport::Settled {
                total_delta: 10,
                sample_count: 1,
                estimate: RateEstimate::Insufficient
            })
        );
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.sample_count(), 0);
    }

    #[test]
    fn test_idle_until_first_increase() {
        let mut session = MonitorSession::new();
        assert_eq!(session.observe(0, 0), None);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.observe(5_000, 0), None);
        assert_eq!(session.phase(), Phase::Idle);

        session.observe(10_000, 100);
        assert_eq!(session.phase(), Phase::Growing);
    }

    #[test]
    fn test_progress_rate_after_third_sample() {
        let mut session = MonitorSession::new();
        session.observe(0, 0);

        let reports = feed(&mut session, &[(1_000, 100), (2_000, 200), (3_000, 300)]);
        let rates: Vec<_> = reports
            .iter()
            .map(|r| match r {
                Some(MonitorReport::Progress { rate, .. }) => *rate,
                other => panic!("unexpected report {other:?}"),
            })
            .collect();

        assert_eq!(rates[0], None);
        assert_eq!(rates[1], None);
        assert!((rates[2].unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_run_reports_std_err() {
        let mut session = MonitorSession::new();
        let start = 1_700_000_000_000i64;
        session.observe(start, 0);

        // Eight growing polls at 5s intervals, ~500 rows/s with a little jitter.
        let jitter = [0, 30, -20, 10, -40, 25, -5, 15];
        for (i, j) in jitter.iter().enumerate() {
            let step = i as i64 + 1;
            let count = (step * 2_500 + j) as u64;
            session.observe(start + step * 5_000, count);
        }
        let last = (8 * 2_500 + 15) as u64;
        let report = session.observe(start + 9 * 5_000, last).unwrap();

        match report {
            MonitorReport::Settled {
                total_delta,
                sample_count,
                estimate: RateEstimate::WithStdErr { rate, std_err },
            } => {
                assert_eq!(total_delta, last);
                assert_eq!(sample_count, 7);
                assert!((rate - 500.0).abs() < 5.0, "rate {rate}");
                assert!(std_err > 0.0 && std_err < 5.0, "std err {std_err}");
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_mid_length_run_reports_rate_only() {
        let mut session = MonitorSession::new();
        session.observe(0, 0);
        for step in 1..=4 {
            session.observe(step * 1_000, (step * 50) as u64);
        }

        match session.observe(5_000, 200) {
            Some(MonitorReport::Settled {
                total_delta: 200,
                sample_count: 3,
                estimate: RateEstimate::Rate { rate },
            }) => assert!((rate - 50.0).abs() < 1e-9),
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_rollback_resets_baseline() {
        let mut session = MonitorSession::new();
        feed(&mut session, &[(0, 0), (1_000, 100), (2_000, 200)]);
        assert_eq!(session.sample_count(), 2);

        // Destination truncated and refilled.
        assert_eq!(session.observe(3_000, 50), None);
        assert_eq!(session.baseline_count(), 50);
        assert_eq!(session.sample_count(), 0);
        assert_eq!(session.phase(), Phase::Growing);

        feed(&mut session, &[(4_000, 150), (5_000, 250), (6_000, 350)]);
        match session.observe(7_000, 350) {
            Some(MonitorReport::Settled {
                total_delta,
                sample_count,
                ..
            }) => {
                assert_eq!(total_delta, 300);
                assert_eq!(sample_count, 2);
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_rollback_to_zero_is_idle() {
        let mut session = MonitorSession::new();
        feed(&mut session, &[(0, 10), (1_000, 20)]);
        session.observe(2_000, 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.baseline_count(), 0);
    }

    #[test]
    fn test_poll_after_settle_starts_new_baseline() {
        let mut session = MonitorSession::new();
        feed(
            &mut session,
            &[(0, 0), (1_000, 100), (2_000, 200), (3_000, 300), (4_000, 300)],
        );

        // Growth straight after a settle is not a sample; it becomes the
        // baseline of the next run.
        assert_eq!(session.observe(5_000, 400), None);
        assert_eq!(session.baseline_count(), 400);
        assert_eq!(session.sample_count(), 0);
        assert_eq!(session.phase(), Phase::Growing);

        let reports = feed(&mut session, &[(6_000, 500), (7_000, 600), (8_000, 600)]);
        assert!(matches!(
            reports[0],
            Some(MonitorReport::Progress {
                sample_count: 1,
                ..
            })
        ));
        assert!(matches!(
            reports[1],
            Some(MonitorReport::Progress {
                sample_count: 2,
                ..
            })
        ));
        assert_eq!(
            reports[2],
            Some(MonitorReport::Settled {
                total_delta: 200,
                sample_count: 1,
                estimate: RateEstimate::Insufficient
            })
        );
    }

    #[test]
    fn test_second_run_measures_its_own_delta() {
        let mut session = MonitorSession::new();
        feed(
            &mut session,
            &[(0, 0), (1_000, 100), (2_000, 200), (3_000, 300), (4_000, 300)],
        );
        assert_eq!(session.baseline_count(), 300);

        // Extra flat polls after settling are silent.
        assert_eq!(session.observe(5_000, 300), None);
        assert_eq!(session.observe(6_000, 300), None);

        let reports = feed(
            &mut session,
            &[(7_000, 400), (8_000, 500), (9_000, 600), (10_000, 700), (11_000, 700)],
        );
        match reports[4] {
            Some(MonitorReport::Settled {
                total_delta,
                sample_count,
                estimate: RateEstimate::Rate { rate },
            }) => {
                assert_eq!(total_delta, 400);
                assert_eq!(sample_count, 3);
                assert!((rate - 100.0).abs() < 1e-9);
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_flat_poll_without_growth_after_reset_goes_idle() {
        let mut session = MonitorSession::new();
        session.observe(0, 500);
        assert_eq!(session.phase(), Phase::Growing);

        assert_eq!(session.observe(1_000, 500), None);
        assert_eq!(session.phase(), Phase::Idle);
    }
}
