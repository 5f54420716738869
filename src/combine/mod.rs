//! Combining Parquet part files into a single file.
//!
//! Every file matching `<base>*.parquet` is streamed, batch by batch, into
//! `<base>_combined.parquet`. The first part's schema is authoritative and
//! every later part is conformed to it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::datatypes::SchemaRef;
use indicatif::ProgressBar;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::config::{CombineOptions, ExpectedShape};
use crate::error::util::{create_file, remove_file};
use crate::error::{Error, Result};
use crate::schema::{check_schema_compatibility, conform_batch};
use crate::utils::io::parquet::{
    DEFAULT_READ_BATCH_SIZE, open_batch_reader, parquet_shape, read_schema,
};
use crate::utils::io::paths::{combined_output_path, discover_parts, is_combined_file, part_glob};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_operation_complete, log_operation_start,
    log_warning,
};

/// Outcome of a successful combine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    /// Path of the combined file
    pub output: PathBuf,
    /// Number of part files written into the output
    pub files_combined: usize,
    /// Number of rows written into the output
    pub rows_written: usize,
    /// Number of top-level columns in the output schema
    pub columns: usize,
    /// Part files removed after combining
    pub deleted: Vec<PathBuf>,
}

/// Combine all Parquet files sharing a base prefix into one file
///
/// The steps run in order and stop at the first failure:
/// 1. discover parts matching `<file_base>*.parquet`
/// 2. write every part into `<file_base>_combined.parquet` using the first
///    part's schema
/// 3. check `part_count`, if given
/// 4. verify the output against `validate`, if given
/// 5. delete the parts, unless `keep_parts` is set
///
/// The part list discovered in step 1 is the one deleted in step 5.
///
/// # Arguments
/// * `file_base` - Base path prefix shared by the parts
/// * `options` - Count, validation, cleanup and writer options
///
/// # Errors
/// Returns an error if no part matches, a part cannot be read or conformed,
/// the part count or output shape does not match, or a part cannot be deleted
pub fn combine_parquets(file_base: &str, options: &CombineOptions) -> Result<CombineSummary> {
    let start = Instant::now();
    let output = combined_output_path(file_base);

    let parts = discover_parts(file_base)?;
    let Some(first) = parts.first() else {
        return Err(Error::NoMatchingFiles {
            pattern: part_glob(file_base),
        });
    };

    log_operation_start("Combining parquet parts into", &output);
    let schema = read_schema(first)?;

    let rows_written = write_combined(&output, &schema, &parts, options)?;
    let files_combined = parts.len();

    if let Some(expected) = options.part_count {
        if expected != files_combined {
            return Err(Error::PartCountMismatch {
                expected,
                actual: files_combined,
            });
        }
        log::info!(
            "Expected part_count matches the number of files found. {expected} files found."
        );
    }

    if let Some(expected) = options.validate {
        validate_output(&output, expected)?;
    }

    let deleted = if options.keep_parts {
        Vec::new()
    } else {
        delete_parts(&parts)?
    };

    log_operation_complete("combined", &output, files_combined, Some(start.elapsed()));
    log::info!(
        "{files_combined} parquet files ({rows_written} rows) combined and written to {}",
        output.display()
    );

    Ok(CombineSummary {
        output,
        files_combined,
        rows_written,
        columns: schema.fields().len(),
        deleted,
    })
}

/// Stream every part into the output file
///
/// The writer is closed even when a part fails, so the footer for the rows
/// written so far is flushed; the part's error is returned in that case.
fn write_combined(
    output: &Path,
    schema: &SchemaRef,
    parts: &[PathBuf],
    options: &CombineOptions,
) -> Result<usize> {
    let props = WriterProperties::builder()
        .set_compression(options.compression)
        .build();
    let mut writer = ArrowWriter::try_new(create_file(output)?, schema.clone(), Some(props))?;

    let progress = options
        .show_progress
        .then(|| create_main_progress_bar(parts.len() as u64, Some("Combining parquet parts")));

    let written = write_parts(&mut writer, schema, parts, progress.as_ref());
    let closed = writer.close();

    if let Some(pb) = &progress {
        finish_progress_bar(pb, Some("Done"));
    }

    let rows = written?;
    closed?;
    Ok(rows)
}

fn write_parts(
    writer: &mut ArrowWriter<std::fs::File>,
    schema: &SchemaRef,
    parts: &[PathBuf],
    progress: Option<&ProgressBar>,
) -> Result<usize> {
    let mut rows = 0;

    for part in parts {
        let (part_schema, reader) = open_batch_reader(part, DEFAULT_READ_BATCH_SIZE)?;

        let issues = check_schema_compatibility(&part_schema, schema);
        if !issues.is_empty() {
            return Err(Error::Schema(format!(
                "{} does not match the combined schema: {}",
                part.display(),
                issues.iter().join("; ")
            )));
        }

        for batch in reader {
            let batch = conform_batch(&batch?, schema)?;
            rows += batch.num_rows();
            writer.write(&batch)?;
        }

        log::debug!("Wrote {}", part.display());
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(rows)
}

/// Compare the combined file's footer against the expected shape
fn validate_output(output: &Path, expected: ExpectedShape) -> Result<()> {
    log::info!(
        "Validating the combined file {} against the following: Rows - {}, Columns - {}",
        output.display(),
        expected.rows,
        expected.columns
    );

    let (rows, columns) = parquet_shape(output)?;
    if rows != expected.rows || columns != expected.columns {
        return Err(Error::ValidationMismatch {
            path: output.to_path_buf(),
            expected_rows: expected.rows,
            expected_columns: expected.columns,
            rows,
            columns,
        });
    }

    log::info!("Combined file {} has the expected shape", output.display());
    Ok(())
}

/// Delete the combined parts, never touching a combined output
///
/// Deletion stops at the first failure; parts removed before it stay removed.
fn delete_parts(parts: &[PathBuf]) -> Result<Vec<PathBuf>> {
    log::info!("Deleting individual parts.");

    let mut deleted = Vec::with_capacity(parts.len());
    for part in parts {
        if is_combined_file(part) {
            log_warning("Skipping deletion of combined file", Some(part));
            continue;
        }
        remove_file(part)?;
        deleted.push(part.clone());
    }

    Ok(deleted)
}
