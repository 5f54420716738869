use std::path::PathBuf;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int64Type, TimeUnit};
use dataeng_utils::{CombineOptions, Error, ExpectedShape, combine_parquets};
use tempfile::TempDir;

use crate::utils::{
    file_base, ids_only_batch, narrow_sales_batch, read_parquet, sales_batch, timestamp_batch,
    write_parquet,
};

/// Three parts of 3, 2 and 4 rows plus an unrelated file
fn setup_parts() -> anyhow::Result<(TempDir, String, Vec<PathBuf>)> {
    let dir = tempfile::tempdir()?;
    let parts = vec![
        write_parquet(dir.path(), "sales_part_0.parquet", &[sales_batch(0, 3)])?,
        write_parquet(dir.path(), "sales_part_1.parquet", &[sales_batch(3, 2)])?,
        write_parquet(dir.path(), "sales_part_2.parquet", &[sales_batch(5, 4)])?,
    ];
    write_parquet(dir.path(), "other.parquet", &[sales_batch(100, 1)])?;
    let base = file_base(dir.path(), "sales_part");
    Ok((dir, base, parts))
}

#[test]
fn test_combine_sums_rows_and_keeps_first_schema() -> anyhow::Result<()> {
    let (_dir, base, parts) = setup_parts()?;

    let summary = combine_parquets(&base, &CombineOptions::default())?;
    assert_eq!(summary.files_combined, 3);
    assert_eq!(summary.rows_written, 9);
    assert_eq!(summary.columns, 2);
    assert!(summary.deleted.is_empty());
    assert_eq!(summary.output, PathBuf::from(format!("{base}_combined.parquet")));

    let batches = read_parquet(&summary.output)?;
    let schema = batches[0].schema();
    let expected = sales_batch(0, 1).schema();
    assert_eq!(schema.fields().len(), expected.fields().len());
    for (field, expected) in schema.fields().iter().zip(expected.fields()) {
        assert_eq!(field.name(), expected.name());
        assert_eq!(field.data_type(), expected.data_type());
    }

    // Parts are written in file name order
    let ids: Vec<i64> = batches
        .iter()
        .flat_map(|batch| batch.column(0).as_primitive::<Int64Type>().values().to_vec())
        .collect();
    assert_eq!(ids, (0..9).collect::<Vec<_>>());

    assert!(parts.iter().all(|part| part.exists()));
    Ok(())
}

#[test]
fn test_combine_ignores_previous_output() -> anyhow::Result<()> {
    let (_dir, base, _parts) = setup_parts()?;

    combine_parquets(&base, &CombineOptions::default())?;
    let summary = combine_parquets(&base, &CombineOptions::default().with_part_count(3))?;
    assert_eq!(summary.files_combined, 3);
    assert_eq!(summary.rows_written, 9);
    Ok(())
}

#[test]
fn test_base_containing_combined_marker_finds_its_parts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let parts = vec![
        write_parquet(dir.path(), "sales_combined_2024_0.parquet", &[sales_batch(0, 2)])?,
        write_parquet(dir.path(), "sales_combined_2024_1.parquet", &[sales_batch(2, 3)])?,
    ];
    let base = file_base(dir.path(), "sales_combined_2024");

    let summary = combine_parquets(&base, &CombineOptions::default().with_part_count(2))?;
    assert_eq!(summary.files_combined, 2);
    assert_eq!(summary.rows_written, 5);

    // A rerun skips the earlier output, and deletion never removes `_combined` paths
    let summary = combine_parquets(&base, &CombineOptions::default().delete_parts())?;
    assert_eq!(summary.files_combined, 2);
    assert!(summary.deleted.is_empty());
    assert!(parts.iter().all(|part| part.exists()));
    assert!(summary.output.exists());
    Ok(())
}

#[test]
fn test_failing_part_still_closes_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let good = write_parquet(dir.path(), "bad_0.parquet", &[sales_batch(0, 3)])?;
    let bad = dir.path().join("bad_1.parquet");
    std::fs::write(&bad, b"this is not a parquet file at all")?;

    let err = combine_parquets(
        &file_base(dir.path(), "bad"),
        &CombineOptions::default().delete_parts(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Parquet(_)));

    // Rows written before the failure are readable and nothing was deleted
    let output = dir.path().join("bad_combined.parquet");
    let rows: usize = read_parquet(&output)?.iter().map(|batch| batch.num_rows()).sum();
    assert_eq!(rows, 3);
    assert!(good.exists() && bad.exists());
    Ok(())
}

#[test]
fn test_truncating_timestamp_part_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_parquet(dir.path(), "ts_0.parquet", &[timestamp_batch(TimeUnit::Second, 1)])?;
    write_parquet(
        dir.path(),
        "ts_1.parquet",
        &[timestamp_batch(TimeUnit::Nanosecond, 1_999_999_999)],
    )?;

    let err =
        combine_parquets(&file_base(dir.path(), "ts"), &CombineOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    Ok(())
}

#[test]
fn test_part_count_mismatch_keeps_parts() -> anyhow::Result<()> {
    let (_dir, base, parts) = setup_parts()?;

    let options = CombineOptions::default()
        .with_part_count(2)
        .with_validation(ExpectedShape::new(9, 2))
        .delete_parts();
    let err = combine_parquets(&base, &options).unwrap_err();

    assert!(matches!(err, Error::PartCountMismatch { expected: 2, actual: 3 }));
    assert_eq!(err.to_string(), "Expected 2 files but found 3 files.");
    assert!(parts.iter().all(|part| part.exists()));
    Ok(())
}

#[test]
fn test_delete_parts_keeps_combined_output() -> anyhow::Result<()> {
    let (dir, base, parts) = setup_parts()?;

    let summary = combine_parquets(&base, &CombineOptions::default().delete_parts())?;
    assert_eq!(summary.deleted, parts);
    assert!(parts.iter().all(|part| !part.exists()));
    assert!(summary.output.exists());
    assert!(dir.path().join("other.parquet").exists());
    Ok(())
}

#[test]
fn test_no_matching_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = file_base(dir.path(), "missing_part");

    let err = combine_parquets(&base, &CombineOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NoMatchingFiles { .. }));
    assert!(!dir.path().join("missing_part_combined.parquet").exists());
    Ok(())
}

#[test]
fn test_validation_passes_for_expected_shape() -> anyhow::Result<()> {
    let (_dir, base, _parts) = setup_parts()?;

    let options = CombineOptions::default().with_validation(ExpectedShape::new(9, 2));
    let summary = combine_parquets(&base, &options)?;
    assert_eq!(summary.rows_written, 9);
    Ok(())
}

#[test]
fn test_validation_mismatch_keeps_parts() -> anyhow::Result<()> {
    let (_dir, base, parts) = setup_parts()?;

    let options = CombineOptions::default()
        .with_validation(ExpectedShape::new(10, 2))
        .delete_parts();
    let err = combine_parquets(&base, &options).unwrap_err();

    match err {
        Error::ValidationMismatch { rows, columns, .. } => {
            assert_eq!(rows, 9);
            assert_eq!(columns, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(parts.iter().all(|part| part.exists()));
    Ok(())
}

#[test]
fn test_narrower_part_is_widened() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_parquet(dir.path(), "wide_0.parquet", &[sales_batch(0, 2)])?;
    write_parquet(dir.path(), "wide_1.parquet", &[narrow_sales_batch(vec![7, 8])])?;

    let summary = combine_parquets(&file_base(dir.path(), "wide"), &CombineOptions::default())?;
    assert_eq!(summary.rows_written, 4);

    let batches = read_parquet(&summary.output)?;
    assert_eq!(batches[0].schema().field(0).data_type(), &DataType::Int64);
    let ids: Vec<i64> = batches
        .iter()
        .flat_map(|batch| batch.column(0).as_primitive::<Int64Type>().values().to_vec())
        .collect();
    assert_eq!(ids, vec![0, 1, 7, 8]);
    Ok(())
}

#[test]
fn test_wider_part_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_parquet(dir.path(), "narrow_0.parquet", &[narrow_sales_batch(vec![1])])?;
    write_parquet(dir.path(), "narrow_1.parquet", &[sales_batch(2, 1)])?;

    let err =
        combine_parquets(&file_base(dir.path(), "narrow"), &CombineOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    Ok(())
}

#[test]
fn test_missing_nullable_column_is_null_filled() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_parquet(dir.path(), "mixed_0.parquet", &[sales_batch(0, 2)])?;
    write_parquet(dir.path(), "mixed_1.parquet", &[ids_only_batch(vec![5, 6, 7])])?;

    let summary = combine_parquets(&file_base(dir.path(), "mixed"), &CombineOptions::default())?;
    assert_eq!(summary.rows_written, 5);

    let null_names: usize = read_parquet(&summary.output)?
        .iter()
        .map(|batch| batch.column(1).null_count())
        .sum();
    assert_eq!(null_names, 3);
    Ok(())
}
