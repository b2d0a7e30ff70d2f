//! PostgreSQL destination: one prepared INSERT per record.

use crate::client::connect;
use crate::error::PostgreSQLPopulatorError;
use crate::insert::{insert_statement, record_params};
use async_trait::async_trait;
use loadtest_generator::Record;
use loadtest_populate::{Destination, WriteError};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Statement};
use tracing::{debug, info};

/// Writes records into an existing PostgreSQL table.
///
/// One client is shared by the whole worker pool; tokio-postgres pipelines
/// concurrent queries over the single connection.
pub struct PostgreSQLDestination {
    client: Client,
    insert: Statement,
    driver: JoinHandle<()>,
    table: String,
}

impl PostgreSQLDestination {
    /// Connect and prepare the INSERT for `table`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let destination = PostgreSQLDestination::connect(
    ///     "host=localhost user=postgres password=postgres dbname=bench",
    ///     "planes",
    /// ).await?;
    /// ```
    pub async fn connect(
        connection_string: &str,
        table: &str,
    ) -> Result<Self, PostgreSQLPopulatorError> {
        if table.is_empty() {
            return Err(PostgreSQLPopulatorError::Config(
                "table name must not be empty".to_string(),
            ));
        }

        let (client, driver) = connect(connection_string).await?;
        let sql = insert_statement(table);
        debug!("Preparing: {}", sql);

        let insert = match client.prepare(&sql).await {
            Ok(statement) => statement,
            Err(e) => {
                driver.abort();
                return Err(e.into());
            }
        };

        info!("Connected to PostgreSQL, writing to {}", table);
        Ok(Self {
            client,
            insert,
            driver,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Destination for PostgreSQLDestination {
    async fn write_record(&self, record: Record) -> Result<(), WriteError> {
        if self.client.is_closed() {
            return Err(WriteError::Closed);
        }
        self.client
            .execute(&self.insert, &record_params(&record))
            .await
            .map(|_| ())
            .map_err(|e| WriteError::Destination(e.to_string()))
    }

    async fn close(&self) {
        debug!("Closing PostgreSQL connection for {}", self.table);
        self.driver.abort();
    }
}
