//! Error types for the PostgreSQL adapter.

use thiserror::Error;

/// Errors raised while setting up the PostgreSQL destination or count source.
#[derive(Error, Debug)]
pub enum PostgreSQLPopulatorError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
