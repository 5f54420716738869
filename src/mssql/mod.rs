//! Batched writes to SQL Server.
//!
//! [`insert_statement`] and [`update_statement`] build parameterized
//! statements from [`ColumnData`]; [`BatchWriter`] executes them in
//! fixed-size batches through a [`Connector`].

pub mod columns;
pub mod executor;
pub mod query;
pub mod value;

#[cfg(feature = "odbc")]
pub mod odbc;

pub use columns::ColumnData;
pub use executor::{BatchConnection, BatchSummary, BatchWriter, Connector};
pub use query::{SqlStatement, TableName, insert_statement, update_statement};
pub use value::SqlValue;

#[cfg(feature = "odbc")]
pub use odbc::{OdbcConnector, write_to_mssql};
