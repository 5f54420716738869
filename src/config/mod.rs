//! Configuration for the Parquet combiner and the batch SQL writer.

use parquet::basic::Compression;

use crate::error::{Error, Result};

/// Default number of rows executed per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default SQL Server schema used when none is given
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Default first month of the fiscal year (October)
pub const DEFAULT_FISCAL_START_MONTH: u32 = 10;

/// Environment variable overriding the batch size
pub const BATCH_SIZE_ENV: &str = "MSSQL_BATCH_SIZE";

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    parse_batch_size(std::env::var(BATCH_SIZE_ENV).ok().as_deref())
}

/// Positive batch size from a raw setting; anything else is ignored
fn parse_batch_size(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|size| *size > 0)
}

/// Expected shape of a combined Parquet file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedShape {
    /// Expected number of rows
    pub rows: usize,
    /// Expected number of top-level columns
    pub columns: usize,
}

impl ExpectedShape {
    /// Create an expected shape from a row and column count
    #[must_use]
    pub const fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

impl TryFrom<&[usize]> for ExpectedShape {
    type Error = Error;

    /// Accepts a `[rows, columns]` slice; any other length is rejected
    fn try_from(values: &[usize]) -> Result<Self> {
        match values {
            [rows, columns] => Ok(Self::new(*rows, *columns)),
            other => Err(Error::InvalidValidateShape(other.len())),
        }
    }
}

/// Options for combining Parquet part files
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// Keep the individual part files after combining
    pub keep_parts: bool,
    /// Expected number of part files
    pub part_count: Option<usize>,
    /// Expected shape of the combined file
    pub validate: Option<ExpectedShape>,
    /// Compression codec for the combined file
    pub compression: Compression,
    /// Show a progress bar while parts are written
    pub show_progress: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            keep_parts: true,
            part_count: None,
            validate: None,
            compression: Compression::SNAPPY,
            show_progress: false,
        }
    }
}

impl CombineOptions {
    /// Delete the part files once they have been combined
    #[must_use]
    pub fn delete_parts(mut self) -> Self {
        self.keep_parts = false;
        self
    }

    /// Require exactly `count` part files
    #[must_use]
    pub fn with_part_count(mut self, count: usize) -> Self {
        self.part_count = Some(count);
        self
    }

    /// Verify the combined file against an expected shape
    #[must_use]
    pub fn with_validation(mut self, shape: ExpectedShape) -> Self {
        self.validate = Some(shape);
        self
    }
}

/// Configuration for the batch SQL writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWriterConfig {
    /// Number of rows executed per connection
    pub batch_size: usize,
}

impl Default for BatchWriterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchWriterConfig {
    /// Create a configuration with an explicit batch size
    ///
    /// # Errors
    /// Returns an error if `batch_size` is zero
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch_size must be at least 1"));
        }
        Ok(Self { batch_size })
    }

    /// Default configuration with the batch size taken from `MSSQL_BATCH_SIZE` when set
    #[must_use]
    pub fn from_env() -> Self {
        get_batch_size().map_or_else(Self::default, |batch_size| Self { batch_size })
    }
}
