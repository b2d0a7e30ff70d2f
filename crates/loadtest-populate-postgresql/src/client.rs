//! Connection setup shared by the destination and the count source.

use crate::error::PostgreSQLPopulatorError;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

/// Connect and spawn the connection driver task.
///
/// The returned handle owns the socket; aborting it closes the connection.
pub(crate) async fn connect(
    connection_string: &str,
) -> Result<(Client, JoinHandle<()>), PostgreSQLPopulatorError> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    if let Err(e) = client.simple_query("SELECT 1").await {
        driver.abort();
        return Err(e.into());
    }

    Ok((client, driver))
}
