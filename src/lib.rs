//! Data engineering helpers: combining Parquet part files, batched
//! INSERT/UPDATE writes to SQL Server, and calendar utilities.

pub mod calendar;
pub mod combine;
pub mod config;
pub mod error;
pub mod mssql;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
pub use combine::{CombineSummary, combine_parquets};
pub use config::{BatchWriterConfig, CombineOptions, ExpectedShape};
pub use error::{Error, Result};

pub use calendar::{FiscalCalendar, Frequency, date_dimension, generate_date_ranges};
pub use mssql::{
    BatchSummary, BatchWriter, ColumnData, SqlStatement, SqlValue, TableName, insert_statement,
    update_statement,
};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Logging
pub use utils::logging::init_logging;
