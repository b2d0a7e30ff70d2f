//! Command-line definitions for ingest-bench.

use clap::{Parser, Subcommand};
use loadtest_monitor_solr::SolrMonitorArgs;
use loadtest_populate_postgresql::{PostgreSQLMonitorArgs, PostgreSQLSendArgs};

#[derive(Parser)]
#[command(name = "ingest-bench")]
#[command(about = "Send paced synthetic records to a data store and measure its ingest rate")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send synthetic plane records at a target rate
    Send {
        #[command(subcommand)]
        destination: SendDestination,
    },

    /// Poll a destination's count and estimate its ingest rate
    Monitor {
        #[command(subcommand)]
        source: MonitorSource,
    },
}

/// Destination to send records to
#[derive(Subcommand)]
pub enum SendDestination {
    /// Insert records into a PostgreSQL table
    #[command(name = "postgresql")]
    PostgreSQL {
        #[command(flatten)]
        args: PostgreSQLSendArgs,
    },
}

/// Store whose count is polled
#[derive(Subcommand)]
pub enum MonitorSource {
    /// Watch the document count of a Solr collection
    #[command(name = "solr")]
    Solr {
        #[command(flatten)]
        args: SolrMonitorArgs,
    },
    /// Watch the row count of a PostgreSQL table
    #[command(name = "postgresql")]
    PostgreSQL {
        #[command(flatten)]
        args: PostgreSQLMonitorArgs,
    },
}
