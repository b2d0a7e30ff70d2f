//! Common CLI argument definitions shared by all senders.

use crate::config::SendConfig;
use crate::error::PopulateError;
use clap::Args;
use loadtest_generator::{SampleSet, SampleSource};
use std::path::PathBuf;

/// Common arguments shared by all `send` destinations.
#[derive(Args, Clone, Debug)]
pub struct CommonSendArgs {
    /// Target send rate in records per second
    #[arg(long)]
    pub rate: u64,

    /// Total number of records to send (the sample set is replayed as needed)
    #[arg(long)]
    pub num_to_send: u64,

    /// Send in bursts every N milliseconds; 0 spaces records evenly
    #[arg(long, default_value = "0")]
    pub burst_delay_ms: u64,

    /// Number of concurrent writers
    #[arg(long, default_value = "8")]
    pub threads: usize,

    /// Records per flushed batch (default: the target rate)
    #[arg(long)]
    pub flush_every: Option<u64>,

    /// Path to a sample set YAML file (default: built-in planes)
    #[arg(long, value_name = "PATH")]
    pub samples: Option<PathBuf>,

    /// Dry-run mode: pace and batch records into memory without connecting to the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Emit progress lines as JSON instead of `sent,rate`
    #[arg(long)]
    pub json: bool,
}

impl CommonSendArgs {
    /// Build and validate the session configuration.
    pub fn to_config(&self) -> Result<SendConfig, PopulateError> {
        let mut config = SendConfig::new(self.rate, self.num_to_send)
            .with_burst_delay_ms(self.burst_delay_ms)
            .with_threads(self.threads);
        if let Some(flush_every) = self.flush_every {
            config = config.with_flush_every(flush_every);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load the sample set and wrap it in a source.
    pub fn sample_source(&self) -> Result<SampleSource, PopulateError> {
        let set = match &self.samples {
            Some(path) => SampleSet::from_file(path)?,
            None => SampleSet::builtin()?,
        };
        Ok(SampleSource::new(set))
    }
}
