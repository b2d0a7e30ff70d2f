//! Command-line interface for ingest-bench
//!
//! ## Sending
//! ```bash
//! # Evenly spaced records
//! ingest-bench send postgresql \
//!   --postgresql-connection-string "host=localhost user=postgres dbname=bench" \
//!   --rate 500 --num-to-send 30000
//!
//! # Pace and batch without a database
//! ingest-bench send postgresql --postgresql-connection-string unused \
//!   --rate 5000 --num-to-send 50000 --burst-delay-ms 50 --dry-run
//! ```
//!
//! ## Monitoring
//! ```bash
//! ingest-bench monitor postgresql \
//!   --postgresql-connection-string "host=localhost user=postgres dbname=bench" \
//!   --table planes --sample-interval-secs 5
//!
//! SOLR_USERNAME=admin SOLR_PASSWORD=secret \
//!   ingest-bench monitor solr --solr-url https://solr:8983/solr/planes --json
//! ```
//!
//! Progress and rate reports are written to stdout, logs to stderr
//! (`RUST_LOG=info` to see them).

use clap::Parser;
use ingest_bench::cli::{Cli, Commands};
use ingest_bench::loadtest::{run_monitor, run_send};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Send { destination } => run_send(destination).await,
        Commands::Monitor { source } => run_monitor(source).await,
    }
}
