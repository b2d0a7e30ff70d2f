//! Common CLI argument definitions shared by all monitors.

use clap::Args;
use std::time::Duration;

/// Common arguments shared by all `monitor` sources.
#[derive(Args, Clone, Debug)]
pub struct CommonMonitorArgs {
    /// Seconds between count polls
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub sample_interval_secs: u64,

    /// Stop after this many polls (default: run until interrupted)
    #[arg(long)]
    pub max_polls: Option<u64>,

    /// Emit reports as JSON instead of delimited lines
    #[arg(long)]
    pub json: bool,
}

impl CommonMonitorArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonMonitorArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.common.interval(), Duration::from_secs(5));
        assert_eq!(cli.common.max_polls, None);
        assert!(!cli.common.json);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = TestCli::try_parse_from(["test", "--sample-interval-secs", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_values() {
        let cli = TestCli::try_parse_from([
            "test",
            "--sample-interval-secs",
            "20",
            "--max-polls",
            "3",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.common.interval(), Duration::from_secs(20));
        assert_eq!(cli.common.max_polls, Some(3));
        assert!(cli.common.json);
    }
}
