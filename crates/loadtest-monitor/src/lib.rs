//! Polling ingest-rate monitor for ingest-bench.
//!
//! The monitor periodically reads a row/document count from a destination and
//! estimates how fast it is growing:
//!
//! ```text
//!  interval tick ──► CountSource::read_count ──► MonitorSession::observe
//!                                                     │
//!                     ┌───────────────────────────────┤
//!                     ▼                               ▼
//!            Progress report                   Settled report
//!        (sample, t, count[, rate])       (delta, rate[, std err])
//! ```
//!
//! While the count keeps rising every observation is fed into an online
//! least-squares fit of count against time. The first poll where the count
//! stops rising closes the run and reports the fitted slope as the ingest rate.
//!
//! The monitor knows nothing about the sender; it only watches the count.

pub mod args;
pub mod monitor;
pub mod regression;
pub mod report;
pub mod session;
pub mod source;

pub use args::CommonMonitorArgs;
pub use monitor::{ChangeMonitor, MonitorStats};
pub use regression::{RegressionAccumulator, RegressionError};
pub use report::{MonitorReport, RateEstimate};
pub use session::{MonitorSession, Phase};
pub use source::{CountSource, ReadError};
