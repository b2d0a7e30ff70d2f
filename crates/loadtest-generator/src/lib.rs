//! Synthetic record source for the ingest-bench load testing tool.
//!
//! This crate provides the `SampleSource` which replays a fixed set of plane
//! templates in order, wrapping back to the first template once the set is
//! exhausted. Every record handed out gets a fresh UUID and the current time,
//! so two records built from the same template are still distinct rows.
//!
//! # Architecture
//!
//! ```text
//! SampleSet (YAML or built-in)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │  SampleSource   │
//! │                 │
//! │  - templates    │
//! │  - index (wraps)│
//! └────────┬────────┘
//!          │
//!          ▼
//!    Record { id, ts, speed, ..., geometry }
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_generator::{SampleSet, SampleSource};
//!
//! let mut source = SampleSource::new(SampleSet::builtin().unwrap());
//! let record = source.next_record();
//! assert_eq!(record.geometry, "POINT (-31.88592 49.21297)");
//! ```
//!
//! # Sample set format
//!
//! ```yaml
//! planes:
//!   - { speed: 240.25, dist: 5024.32, bearing: -70.72, rtid: 1,
//!       orig: "Mielec Airport", dest: "Frank Pais International Airport",
//!       secs_to_dep: -1, lon: -31.88592, lat: 49.21297 }
//! ```

pub mod generator;
pub mod record;
pub mod sample_set;

// Re-exports for convenience
pub use generator::SampleSource;
pub use record::{PlaneTemplate, Record};
pub use sample_set::{GeneratorError, SampleSet};
