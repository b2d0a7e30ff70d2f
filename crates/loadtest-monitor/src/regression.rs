//! Online least-squares fit of count against time.
//!
//! Samples can be added and removed one at a time in O(1). The running sums
//! are kept relative to the first sample added since the accumulator was last
//! empty; epoch-millisecond timestamps squared would otherwise lose most of
//! their precision. The slope is invariant under that shift.

use std::collections::HashMap;
use thiserror::Error;

/// Why a slope or standard error could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("insufficient samples: need at least {required}, have {actual}")]
    InsufficientSamples { required: u64, actual: u64 },

    #[error("all sample timestamps are identical")]
    DegenerateTimestamps,

    #[error("sample ({t}, {c}) was never added")]
    UnknownSample { t: f64, c: f64 },
}

/// Running sums for ordinary least squares over `(t, c)` pairs.
#[derive(Debug, Clone, Default)]
pub struct RegressionAccumulator {
    n: u64,
    origin: Option<(f64, f64)>,
    sum_t: f64,
    sum_c: f64,
    sum_tc: f64,
    sum_tt: f64,
    sum_cc: f64,
    // Multiset of live samples, keyed by bit pattern, so `remove` can reject
    // pairs that were never added.
    live: HashMap<(u64, u64), u64>,
}

fn sample_key(t: f64, c: f64) -> (u64, u64) {
    // `+ 0.0` folds -0.0 into 0.0.
    ((t + 0.0).to_bits(), (c + 0.0).to_bits())
}

impl RegressionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples currently in the fit.
    pub fn len(&self) -> u64 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add one observation.
    pub fn add(&mut self, t: f64, c: f64) {
        let (t0, c0) = *self.origin.get_or_insert((t, c));
        let (x, y) = (t - t0, c - c0);

        self.n += 1;
        self.sum_t += x;
        self.sum_c += y;
        self.sum_tc += x * y;
        self.sum_tt += x * x;
        self.sum_cc += y * y;
        *self.live.entry(sample_key(t, c)).or_insert(0) += 1;
    }

    /// Remove an observation previously passed to [`add`](Self::add).
    ///
    /// The sums are left untouched if the pair is not currently in the fit.
    pub fn remove(&mut self, t: f64, c: f64) -> Result<(), RegressionError> {
        let key = sample_key(t, c);
        match self.live.get_mut(&key) {
            Some(remaining) if *remaining > 1 => *remaining -= 1,
            Some(_) => {
                self.live.remove(&key);
            }
            None => return Err(RegressionError::UnknownSample { t, c }),
        }

        if self.n == 1 {
            // Last sample out: start from exact zeros instead of rounding residue.
            self.clear();
            return Ok(());
        }

        let (t0, c0) = self.origin.unwrap_or((t, c));
        let (x, y) = (t - t0, c - c0);

        self.n -= 1;
        self.sum_t -= x;
        self.sum_c -= y;
        self.sum_tc -= x * y;
        self.sum_tt -= x * x;
        self.sum_cc -= y * y;
        Ok(())
    }

    /// Least-squares slope, in count units per time unit.
    pub fn slope(&self) -> Result<f64, RegressionError> {
        self.require(2)?;
        let n = self.n as f64;
        let denominator = self.denominator()?;
        Ok((n * self.sum_tc - self.sum_t * self.sum_c) / denominator)
    }

    /// Standard error of the slope. Needs at least three samples.
    pub fn slope_std_err(&self) -> Result<f64, RegressionError> {
        self.require(3)?;
        self.denominator()?;

        let n = self.n as f64;
        let sxx = self.sum_tt - self.sum_t * self.sum_t / n;
        let sxy = self.sum_tc - self.sum_t * self.sum_c / n;
        let syy = self.sum_cc - self.sum_c * self.sum_c / n;
        let sse = (syy - sxy * sxy / sxx).max(0.0);

        Ok((sse / (n - 2.0) / sxx).sqrt())
    }

    fn require(&self, required: u64) -> Result<(), RegressionError> {
        if self.n < required {
            return Err(RegressionError::InsufficientSamples {
                required,
                actual: self.n,
            });
        }
        Ok(())
    }

    /// `nΣt² − (Σt)²`, rejected when it is zero up to rounding.
    fn denominator(&self) -> Result<f64, RegressionError> {
        let n_tt = self.n as f64 * self.sum_tt;
        let denominator = n_tt - self.sum_t * self.sum_t;
        if denominator <= n_tt * 1e-12 || denominator <= 0.0 {
            return Err(RegressionError::DegenerateTimestamps);
        }
        Ok(denominator)
    }
}
