//! Count sources polled by the monitor.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A poll that did not produce a count.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("count request failed: {0}")]
    Request(String),

    #[error("malformed count response: {0}")]
    Parse(String),
}

/// Point-in-time count of rows or documents at a destination.
#[async_trait]
pub trait CountSource: Send + Sync + 'static {
    /// Short label for log lines.
    fn name(&self) -> &str;

    async fn read_count(&self) -> Result<u64, ReadError>;
}

#[async_trait]
impl<S: CountSource> CountSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read_count(&self) -> Result<u64, ReadError> {
        (**self).read_count().await
    }
}
