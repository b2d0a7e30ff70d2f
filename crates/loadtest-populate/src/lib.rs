//! Paced record sender for ingest-bench.
//!
//! This crate drives synthetic records into a destination at a target rate:
//!
//! ```text
//! SampleSource ──► RateController ──► Batch ──► AsyncBulkSender ──► Destination
//!   (cyclic)        (delay/burst)     (flush      (bounded worker      (adapter)
//!                                      cadence)    pool)
//! ```
//!
//! `SendSession` owns every stage. The destination is only reachable through
//! the `Destination` trait, so any store with an async single-record write can
//! be load tested.
//!
//! # Example
//!
//! ```ignore
//! use loadtest_generator::{SampleSet, SampleSource};
//! use loadtest_populate::{MemoryDestination, SendConfig, SendSession};
//!
//! let config = SendConfig::new(1000, 10_000).with_threads(8);
//! let source = SampleSource::new(SampleSet::builtin()?);
//! let report = SendSession::new(config, source, MemoryDestination::new())?
//!     .run()
//!     .await?;
//! println!("{}", report.summary());
//! ```

pub mod args;
pub mod config;
pub mod destination;
pub mod error;
pub mod metrics;
pub mod rate;
pub mod sender;
pub mod session;

pub use args::CommonSendArgs;
pub use config::SendConfig;
pub use destination::{Destination, MemoryDestination};
pub use error::{PopulateError, WriteError};
pub use metrics::{SendProgress, SendReport, WriteStats};
pub use rate::{Pacing, RateController};
pub use sender::AsyncBulkSender;
pub use session::SendSession;
