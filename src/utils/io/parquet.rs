//! Parquet file operations
//!
//! Thin helpers over the `parquet` crate's Arrow reader: open a file as a
//! stream of record batches, read its Arrow schema, and read its shape from
//! the footer without decoding any pages.

use std::path::Path;

use arrow::datatypes::SchemaRef;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::error::{Error, Result};
use crate::error::util::open_file;

/// Default batch size for Parquet reading
pub const DEFAULT_READ_BATCH_SIZE: usize = 8192;

/// Read the Arrow schema stored in a Parquet file
///
/// # Arguments
/// * `path` - Path to the Parquet file
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_schema(path: &Path) -> Result<SchemaRef> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?;
    Ok(builder.schema().clone())
}

/// Open a Parquet file as an iterator of record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `batch_size` - Maximum number of rows per batch
///
/// # Returns
/// The reader together with the file's Arrow schema
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn open_batch_reader(
    path: &Path,
    batch_size: usize,
) -> Result<(SchemaRef, ParquetRecordBatchReader)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(batch_size).build()?;
    Ok((schema, reader))
}

/// Read the row count and top-level column count from a Parquet footer
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid Parquet, or
/// its footer records a negative row count
pub fn parquet_shape(path: &Path) -> Result<(usize, usize)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?;
    let columns = builder.schema().fields().len();
    let rows = footer_row_count(path, builder.metadata().file_metadata().num_rows())?;
    Ok((rows, columns))
}

fn footer_row_count(path: &Path, num_rows: i64) -> Result<usize> {
    usize::try_from(num_rows).map_err(|_| {
        Error::Schema(format!(
            "{} has an invalid row count in its footer: {num_rows}",
            path.display()
        ))
    })
}
