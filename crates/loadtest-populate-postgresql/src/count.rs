//! PostgreSQL row count source for the monitor.

use crate::client::connect;
use crate::error::PostgreSQLPopulatorError;
use crate::insert::count_statement;
use async_trait::async_trait;
use loadtest_monitor::{CountSource, ReadError};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Statement};

/// Polls `SELECT COUNT(*)` on one table.
pub struct PostgreSQLCount {
    client: Client,
    query: Statement,
    driver: JoinHandle<()>,
    label: String,
}

impl PostgreSQLCount {
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
        let query = match client.prepare(&count_statement(table)).await {
            Ok(statement) => statement,
            Err(e) => {
                driver.abort();
                return Err(e.into());
            }
        };

        Ok(Self {
            client,
            query,
            driver,
            label: format!("postgresql table {table}"),
        })
    }
}

impl Drop for PostgreSQLCount {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl CountSource for PostgreSQLCount {
    fn name(&self) -> &str {
        &self.label
    }

    async fn read_count(&self) -> Result<u64, ReadError> {
        let row = self
            .client
            .query_one(&self.query, &[])
            .await
            .map_err(|e| ReadError::Request(e.to_string()))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| ReadError::Parse(e.to_string()))?;

        u64::try_from(count).map_err(|_| ReadError::Parse(format!("negative row count {count}")))
    }
}
