//! Monitor command runner.

use anyhow::Context;
use loadtest_monitor::{ChangeMonitor, CommonMonitorArgs, CountSource, MonitorStats};
use loadtest_populate_postgresql::PostgreSQLCount;

use super::mask_connection_password;
use super::output::print_line;
use super::shutdown::cancel_on_ctrl_c;
use crate::cli::MonitorSource;

/// Run the monitor command until interrupted or `--max-polls` is reached.
pub async fn run_monitor(source: MonitorSource) -> anyhow::Result<()> {
    let stats = match source {
        MonitorSource::Solr { args } => {
            let count = args
                .count_source()
                .context("Invalid Solr monitor configuration")?;
            watch(count, &args.common).await
        }
        MonitorSource::PostgreSQL { args } => {
            tracing::info!(
                "Connecting to PostgreSQL at {}",
                mask_connection_password(&args.postgresql_connection_string)
            );
            let count = PostgreSQLCount::connect(&args.postgresql_connection_string, &args.table)
                .await
                .context("Failed to connect to PostgreSQL")?;
            watch(count, &args.common).await
        }
    };

    if stats.failed_reads > 0 {
        tracing::warn!("{} of {} polls failed", stats.failed_reads, stats.ticks);
    }
    Ok(())
}

async fn watch<S: CountSource>(source: S, common: &CommonMonitorArgs) -> MonitorStats {
    let json = common.json;
    let mut monitor = ChangeMonitor::new(source, common.interval())
        .with_reporter(move |report| print_line(report, json))
        .with_cancellation(cancel_on_ctrl_c());
    if let Some(max_polls) = common.max_polls {
        monitor = monitor.with_max_ticks(max_polls);
    }
    monitor.run().await
}
