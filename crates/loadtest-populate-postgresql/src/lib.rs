//! PostgreSQL adapter for ingest-bench.
//!
//! Provides a [`PostgreSQLDestination`] that inserts one row per record with a
//! prepared statement, and a [`PostgreSQLCount`] that polls `SELECT COUNT(*)`
//! for the monitor.
//!
//! The target table is expected to exist already:
//!
//! ```sql
//! CREATE TABLE planes (
//!     id        uuid PRIMARY KEY,
//!     ts        timestamptz NOT NULL,
//!     speed     double precision,
//!     dist      double precision,
//!     bearing   double precision,
//!     rtid      integer,
//!     orig      text,
//!     dest      text,
//!     secstodep integer,
//!     lon       double precision,
//!     lat       double precision,
//!     geometry  text
//! );
//! ```

pub mod args;
mod client;
pub mod count;
pub mod destination;
pub mod error;
pub mod insert;

pub use args::{PostgreSQLMonitorArgs, PostgreSQLSendArgs};
pub use count::PostgreSQLCount;
pub use destination::PostgreSQLDestination;
pub use error::PostgreSQLPopulatorError;
