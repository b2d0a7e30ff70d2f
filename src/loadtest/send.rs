//! Send command runner.

use anyhow::Context;
use loadtest_generator::SampleSource;
use loadtest_populate::{Destination, MemoryDestination, SendConfig, SendReport, SendSession};
use loadtest_populate_postgresql::PostgreSQLDestination;

use super::mask_connection_password;
use super::output::print_line;
use super::shutdown::cancel_on_ctrl_c;
use crate::cli::SendDestination;

/// Run the send command against the chosen destination.
pub async fn run_send(destination: SendDestination) -> anyhow::Result<()> {
    match destination {
        SendDestination::PostgreSQL { args } => {
            // Configuration problems surface before any connection is opened.
            let config = args
                .common
                .to_config()
                .context("Invalid send configuration")?;
            let source = args
                .common
                .sample_source()
                .context("Failed to load sample set")?;
            let json = args.common.json;

            if args.common.dry_run {
                tracing::info!(
                    "[DRY-RUN] Would send to PostgreSQL table '{}' at {}",
                    args.table,
                    mask_connection_password(&args.postgresql_connection_string)
                );
                let report = send(config, source, MemoryDestination::new(), json).await?;
                tracing::info!("[DRY-RUN] {} records paced into memory", report.sent);
                return Ok(());
            }

            tracing::info!(
                "Sending to PostgreSQL table '{}' at {}",
                args.table,
                mask_connection_password(&args.postgresql_connection_string)
            );
            let destination =
                PostgreSQLDestination::connect(&args.postgresql_connection_string, &args.table)
                    .await
                    .context("Failed to connect to PostgreSQL")?;

            let report = send(config, source, destination, json).await?;
            if report.writes.failed > 0 {
                tracing::warn!(
                    "{} of {} writes failed",
                    report.writes.failed,
                    report.writes.submitted
                );
            }
        }
    }

    Ok(())
}

/// Drive one session to completion, printing progress at every flush and the
/// achieved rate at the end.
async fn send<D: Destination>(
    config: SendConfig,
    source: SampleSource,
    destination: D,
    json: bool,
) -> anyhow::Result<SendReport> {
    let report = SendSession::new(config, source, destination)?
        .with_progress(move |progress| print_line(progress, json))
        .with_cancellation(cancel_on_ctrl_c())
        .run()
        .await
        .context("Send session failed")?;

    print_line(&report.final_progress(), json);
    tracing::info!("{}", report.summary());
    Ok(report)
}
