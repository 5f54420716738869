//! Error handling for the data engineering utilities.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors produced by the combiner, the SQL writer and the helper utilities
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error opening, creating or deleting a file
    #[error("IO error for {}: {source}", path.display())]
    Io {
        /// Path the operation was working on
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error building or converting Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// An argument was outside its accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No part files matched the discovery pattern
    #[error("No matching files found for pattern: {pattern}")]
    NoMatchingFiles {
        /// The glob-style pattern that was searched
        pattern: String,
    },

    /// The number of combined parts differs from the expected count
    #[error("Expected {expected} files but found {actual} files.")]
    PartCountMismatch {
        /// Count supplied by the caller
        expected: usize,
        /// Count actually processed
        actual: usize,
    },

    /// The validate list did not have exactly two elements
    #[error("The validate list must contain 2 elements: [rows, columns], got {0}")]
    InvalidValidateShape(usize),

    /// The combined file does not have the expected shape
    #[error(
        "Validation failed for {}: expected {expected_rows} rows and {expected_columns} columns, found {rows} rows and {columns} columns",
        path.display()
    )]
    ValidationMismatch {
        /// The combined output file
        path: PathBuf,
        /// Expected row count
        expected_rows: usize,
        /// Expected column count
        expected_columns: usize,
        /// Row count found in the file footer
        rows: usize,
        /// Column count found in the file schema
        columns: usize,
    },

    /// A record batch could not be conformed to the authoritative schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// The column data has no columns
    #[error("Data dict is empty. Cannot execute query with no data.")]
    EmptyData,

    /// Columns with different row counts
    #[error(
        "All columns must have the same number of rows. Column '{column}' has a different length ({actual}, expected {expected})."
    )]
    LengthMismatch {
        /// The offending column
        column: String,
        /// Row count of the first column
        expected: usize,
        /// Row count of the offending column
        actual: usize,
    },

    /// An UPDATE was requested without id columns
    #[error("id_columns must contain at least one column name.")]
    EmptyIdColumns,

    /// A statement references a column the data does not contain
    #[error("Column '{0}' is not present in the column data")]
    UnknownColumn(String),

    /// A database driver error raised while executing a batch
    #[error("Error processing data: {0}")]
    Execution(String),
}

impl Error {
    /// Wrap an IO error with the path it relates to
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
