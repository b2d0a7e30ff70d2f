//! Error types for the record sender.

use loadtest_generator::GeneratorError;
use thiserror::Error;

/// Errors that stop a send session.
#[derive(Error, Debug)]
pub enum PopulateError {
    /// Invalid rate, pool size, flush cadence or similar.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sample set could not be loaded.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// The worker pool was shut down while records were still being submitted.
    #[error("Sender worker pool is closed")]
    SenderClosed,
}

/// A single failed write.
///
/// Write failures are counted and logged by the sender; they never stop a session.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The destination rejected or failed the write.
    #[error("Destination error: {0}")]
    Destination(String),

    /// The destination connection was already closed.
    #[error("Destination is closed")]
    Closed,
}
