use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Int32Array, Int64Array, StringArray, TimestampNanosecondArray,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use dataeng_utils::Result;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Write `batches` into `dir/name` as a single Parquet file
pub fn write_parquet(dir: &Path, name: &str, batches: &[RecordBatch]) -> Result<PathBuf> {
    let path = dir.join(name);
    let schema = batches
        .first()
        .map(RecordBatch::schema)
        .ok_or(dataeng_utils::Error::EmptyData)?;

    let file = File::create(&path).map_err(|e| dataeng_utils::Error::io(&path, e))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(path)
}

/// A two-column `(id Int64, name Utf8)` batch with ids `start..start + len`
#[must_use]
pub fn sales_batch(start: i64, len: usize) -> RecordBatch {
    let ids: Vec<i64> = (start..).take(len).collect();
    let names: Vec<String> = ids.iter().map(|id| format!("item-{id}")).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(ids)),
        Arc::new(StringArray::from(names)),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

/// Same shape as [`sales_batch`] but with a narrower `Int32` id column
#[must_use]
pub fn narrow_sales_batch(ids: Vec<i32>) -> RecordBatch {
    let names: Vec<String> = ids.iter().map(|id| format!("item-{id}")).collect();
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(ids)),
        Arc::new(StringArray::from(names)),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

/// A batch holding only the `id` column
#[must_use]
pub fn ids_only_batch(ids: Vec<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(ids)) as ArrayRef]).unwrap()
}

/// A single-row `ts` timestamp column in the given unit
#[must_use]
pub fn timestamp_batch(unit: TimeUnit, value: i64) -> RecordBatch {
    let array: ArrayRef = match unit {
        TimeUnit::Nanosecond => Arc::new(TimestampNanosecondArray::from(vec![value])),
        _ => Arc::new(TimestampSecondArray::from(vec![value])),
    };
    let schema = Arc::new(Schema::new(vec![Field::new(
        "ts",
        array.data_type().clone(),
        false,
    )]));
    RecordBatch::try_new(schema, vec![array]).unwrap()
}

/// Base prefix string for parts named `<prefix>*.parquet` inside `dir`
#[must_use]
pub fn file_base(dir: &Path, prefix: &str) -> String {
    dir.join(prefix).to_string_lossy().into_owned()
}

/// Read every batch of a Parquet file
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).map_err(|e| dataeng_utils::Error::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}
