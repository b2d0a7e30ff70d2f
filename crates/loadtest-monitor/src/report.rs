//! Reports emitted by the monitor.

use serde::Serialize;
use std::fmt;

/// Rate estimate produced when a growth run settles.
///
/// Rates are in counts per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateEstimate {
    /// More than five samples: rate and the standard error of the fit.
    WithStdErr { rate: f64, std_err: f64 },
    /// Two to five samples.
    Rate { rate: f64 },
    /// Fewer than two samples.
    Insufficient,
}

impl RateEstimate {
    pub fn rate(&self) -> Option<f64> {
        match self {
            RateEstimate::WithStdErr { rate, .. } | RateEstimate::Rate { rate } => Some(*rate),
            RateEstimate::Insufficient => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum MonitorReport {
    /// The count grew since the previous poll.
    Progress {
        sample_count: u64,
        timestamp_ms: i64,
        count: u64,
        /// Present once more than two samples are in the fit.
        rate: Option<f64>,
    },
    /// The count stopped growing; the run is closed.
    Settled {
        total_delta: u64,
        sample_count: u64,
        estimate: RateEstimate,
    },
}

impl fmt::Display for MonitorReport {
    /// Delimited form: `sampleCount,timestamp,count[,rate]` while growing and
    /// `totalDelta,rate[,stdErr]` on settle.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorReport::Progress {
                sample_count,
                timestamp_ms,
                count,
                rate,
            } => {
                write!(f, "{sample_count},{timestamp_ms},{count}")?;
                if let Some(rate) = rate {
                    write!(f, ",{rate:.0}")?;
                }
                Ok(())
            }
            MonitorReport::Settled {
                total_delta,
                estimate,
                ..
            } => match estimate {
                RateEstimate::WithStdErr { rate, std_err } => {
                    write!(f, "{total_delta},{rate:.2},{std_err:.4}")
                }
                RateEstimate::Rate { rate } => write!(f, "{total_delta},{rate:.2}"),
                RateEstimate::Insufficient => {
                    write!(f, "{total_delta},not enough samples to calculate rate")
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_format() {
        let early = MonitorReport::Progress {
            sample_count: 2,
            timestamp_ms: 1_700_000_000_000,
            count: 500,
            rate: None,
        };
        let later = MonitorReport::Progress {
            sample_count: 3,
            timestamp_ms: 1_700_000_005_000,
            count: 1000,
            rate: Some(99.6),
        };

        assert_eq!(early.to_string(), "2,1700000000000,500");
        assert_eq!(later.to_string(), "3,1700000005000,1000,100");
    }

    #[test]
    fn test_settled_format() {
        let settled = |estimate| MonitorReport::Settled {
            total_delta: 5000,
            sample_count: 6,
            estimate,
        };

        assert_eq!(
            settled(RateEstimate::WithStdErr {
                rate: 100.0,
                std_err: 0.12346
            })
            .to_string(),
            "5000,100.00,0.1235"
        );
        assert_eq!(
            settled(RateEstimate::Rate { rate: 12.5 }).to_string(),
            "5000,12.50"
        );
        assert_eq!(
            settled(RateEstimate::Insufficient).to_string(),
            "5000,not enough samples to calculate rate"
        );
    }

    #[test]
    fn test_estimate_rate() {
        assert_eq!(RateEstimate::Rate { rate: 3.0 }.rate(), Some(3.0));
        assert_eq!(RateEstimate::Insufficient.rate(), None);
    }
}
