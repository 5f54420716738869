//! ODBC connector for SQL Server.
//!
//! Batches are bound as text columns and sent with the driver's array
//! parameter binding, the ODBC equivalent of a fast `executemany`. SQL
//! Server converts each text value into the target column type.

use odbc_api::{Connection, ConnectionOptions, Environment};

use crate::config::BatchWriterConfig;
use crate::error::{Error, Result};
use crate::mssql::columns::ColumnData;
use crate::mssql::executor::{BatchConnection, BatchSummary, BatchWriter, Connector};
use crate::mssql::query::SqlStatement;
use crate::mssql::value::SqlValue;

/// Opens ODBC connections from a driver connection string
pub struct OdbcConnector {
    environment: Environment,
    connection_string: String,
}

impl std::fmt::Debug for OdbcConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Connection strings can carry credentials
        f.debug_struct("OdbcConnector").finish_non_exhaustive()
    }
}

impl OdbcConnector {
    /// Create a connector for a full driver connection string, e.g.
    /// `DRIVER={ODBC Driver 17 for SQL Server};SERVER=localhost;DATABASE=db;Trusted_Connection=yes;`
    ///
    /// # Errors
    /// Returns an error if the ODBC environment cannot be allocated
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        let environment = Environment::new().map_err(|e| Error::Execution(e.to_string()))?;
        Ok(Self {
            environment,
            connection_string: connection_string.into(),
        })
    }
}

/// A single ODBC connection with autocommit disabled
pub struct OdbcConnection<'env> {
    connection: Connection<'env>,
}

impl Connector for OdbcConnector {
    type Error = odbc_api::Error;
    type Connection<'a> = OdbcConnection<'a>;

    fn connect(&self) -> std::result::Result<OdbcConnection<'_>, odbc_api::Error> {
        let connection = self
            .environment
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())?;
        connection.set_autocommit(false)?;
        Ok(OdbcConnection { connection })
    }
}

impl BatchConnection for OdbcConnection<'_> {
    type Error = odbc_api::Error;

    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> std::result::Result<(), odbc_api::Error> {
        if rows.is_empty() {
            return Ok(());
        }

        let texts: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|row| row.iter().map(SqlValue::to_sql_text).collect())
            .collect();
        let num_columns = texts.first().map_or(0, Vec::len);
        let max_str_len = (0..num_columns).map(|column| {
            texts
                .iter()
                .filter_map(|row| row[column].as_ref().map(String::len))
                .max()
                .unwrap_or(0)
                .max(1)
        });

        let prepared = self.connection.prepare(sql)?;
        let mut inserter = prepared.into_text_inserter(texts.len(), max_str_len)?;
        for row in &texts {
            inserter.append(row.iter().map(|value| value.as_deref().map(str::as_bytes)))?;
        }
        inserter.execute()?;
        Ok(())
    }

    fn commit(&mut self) -> std::result::Result<(), odbc_api::Error> {
        self.connection.commit()
    }
}

/// Execute `statement` over `data` against SQL Server in batches of `batch_size`
///
/// # Errors
/// Returns the precondition errors of [`BatchWriter::write`], or `Execution`
/// if the environment cannot be created or a batch fails
pub fn write_to_mssql(
    connection_string: &str,
    data: &ColumnData,
    statement: &SqlStatement,
    batch_size: usize,
) -> Result<BatchSummary> {
    let config = BatchWriterConfig::new(batch_size)?;
    let writer = BatchWriter::with_config(OdbcConnector::new(connection_string)?, config);
    writer.write(data, statement)
}
