//! Solr adapter for ingest-bench.
//!
//! [`SolrCount`] reads the number of documents in a collection with a
//! zero-row select query, for use as the monitor's count source.

pub mod args;
pub mod count;
pub mod error;

pub use args::SolrMonitorArgs;
pub use count::{parse_num_found, SolrCount};
pub use error::SolrCountError;
