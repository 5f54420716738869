//! Batched statement execution.
//!
//! Rows are executed in fixed-size batches. Every batch opens its own
//! connection, executes all of its rows, commits and releases the
//! connection. A failed batch does not roll back earlier batches.

use std::time::Instant;

use crate::config::BatchWriterConfig;
use crate::error::{Error, Result};
use crate::mssql::columns::ColumnData;
use crate::mssql::query::SqlStatement;
use crate::mssql::value::SqlValue;

/// An open database connection that can bulk execute a prepared statement
pub trait BatchConnection {
    /// Driver error type
    type Error: std::error::Error;

    /// Prepare `sql` and execute it once per row
    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> std::result::Result<(), Self::Error>;

    /// Commit the work executed on this connection
    fn commit(&mut self) -> std::result::Result<(), Self::Error>;
}

/// Opens connections for the batch writer
pub trait Connector {
    /// Driver error type
    type Error: std::error::Error;

    /// Connection handed out for a single batch; dropping it releases it
    type Connection<'a>: BatchConnection<Error = Self::Error>
    where
        Self: 'a;

    /// Open a new connection
    fn connect(&self) -> std::result::Result<Self::Connection<'_>, Self::Error>;
}

/// Summary of a completed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows executed
    pub rows: usize,
    /// Batches executed, one connection each
    pub batches: usize,
}

/// Executes statements over column data in fixed-size batches
#[derive(Debug)]
pub struct BatchWriter<C> {
    connector: C,
    config: BatchWriterConfig,
}

impl<C: Connector> BatchWriter<C> {
    /// Create a writer with the default batch size
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, BatchWriterConfig::default())
    }

    /// Create a writer with an explicit configuration
    pub const fn with_config(connector: C, config: BatchWriterConfig) -> Self {
        Self { connector, config }
    }

    /// The underlying connector
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Execute `statement` once for every row of `data`
    ///
    /// Rows are built by zipping the columns named by the statement's
    /// parameters, in parameter order. All checks run before any connection
    /// is opened.
    ///
    /// # Errors
    /// Returns `EmptyData` or `LengthMismatch` for malformed data,
    /// `UnknownColumn` if the statement binds a missing column,
    /// `InvalidArgument` for a zero batch size, and `Execution` carrying the
    /// driver's message if a batch fails
    pub fn write(&self, data: &ColumnData, statement: &SqlStatement) -> Result<BatchSummary> {
        let batch_size = self.config.batch_size;
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch_size must be at least 1"));
        }

        let rows = data.rows(statement.parameters())?;
        let start = Instant::now();
        let mut batches = 0;

        for batch in rows.chunks(batch_size) {
            self.process_batch(statement.sql(), batch)?;
            batches += 1;
            log::debug!("Executed batch {batches} ({} rows)", batch.len());
        }

        log::info!(
            "Executed {} rows in {batches} batches in {:?}",
            rows.len(),
            start.elapsed()
        );

        Ok(BatchSummary {
            rows: rows.len(),
            batches,
        })
    }

    fn process_batch(&self, sql: &str, batch: &[Vec<SqlValue>]) -> Result<()> {
        let mut connection = self.connector.connect().map_err(execution_error)?;
        connection
            .execute_batch(sql, batch)
            .and_then(|()| connection.commit())
            .map_err(execution_error)
    }
}

fn execution_error<E: std::error::Error>(error: E) -> Error {
    Error::Execution(error.to_string())
}
