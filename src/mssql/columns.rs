//! Column-oriented input data for the batch writer.

use arrow::array::{Array, ArrayRef, AsArray, PrimitiveArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type,
    Int16Type, Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::mssql::value::SqlValue;

/// An ordered mapping from column name to column values
///
/// Columns keep their insertion order. That order is the order statements
/// list their columns in, and the order rows are built in unless a statement
/// says otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnData {
    columns: Vec<(String, Vec<SqlValue>)>,
}

impl ColumnData {
    /// Create empty column data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, builder style
    ///
    /// A column with the same name is replaced in place.
    #[must_use]
    pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.insert_column(name, values);
        self
    }

    /// Add or replace a column
    pub fn insert_column<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let name = name.into();
        let values: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Values of a column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[SqlValue]> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Whether a column exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of columns
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check the data has columns of equal length and return the row count
    ///
    /// # Errors
    /// Returns `EmptyData` if there are no columns, or `LengthMismatch`
    /// naming the first column whose length differs from the first column's
    pub fn validate(&self) -> Result<usize> {
        let Some((_, first)) = self.columns.first() else {
            return Err(Error::EmptyData);
        };
        let expected = first.len();

        for (name, values) in &self.columns {
            if values.len() != expected {
                return Err(Error::LengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: values.len(),
                });
            }
        }

        Ok(expected)
    }

    /// Build row tuples by zipping the named columns in the given order
    ///
    /// # Errors
    /// Returns the `validate` errors, or `UnknownColumn` if a name is not a column
    pub fn rows<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<Vec<SqlValue>>> {
        let num_rows = self.validate()?;
        let columns = order
            .iter()
            .map(|name| {
                self.column(name.as_ref())
                    .ok_or_else(|| Error::UnknownColumn(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((0..num_rows)
            .map(|row| columns.iter().map(|values| values[row].clone()).collect())
            .collect())
    }

    /// Convert an Arrow record batch into column data
    ///
    /// # Errors
    /// Returns an error if a column type cannot be represented as `SqlValue`
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let mut data = Self::new();
        for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
            data.insert_column(field.name().clone(), array_values(array)?);
        }
        Ok(data)
    }
}

/// Convert an Arrow array into a vector of `SqlValue`
fn array_values(array: &ArrayRef) -> Result<Vec<SqlValue>> {
    let values = match array.data_type() {
        DataType::Null => vec![SqlValue::Null; array.len()],
        DataType::Boolean => array.as_boolean().iter().map(SqlValue::from).collect(),
        DataType::Int8 => primitive_values::<Int8Type, _>(array, SqlValue::from),
        DataType::Int16 => primitive_values::<Int16Type, _>(array, SqlValue::from),
        DataType::Int32 => primitive_values::<Int32Type, _>(array, SqlValue::from),
        DataType::Int64 => primitive_values::<Int64Type, _>(array, SqlValue::from),
        DataType::UInt8 => primitive_values::<UInt8Type, _>(array, SqlValue::from),
        DataType::UInt16 => primitive_values::<UInt16Type, _>(array, SqlValue::from),
        DataType::UInt32 => primitive_values::<UInt32Type, _>(array, SqlValue::from),
        DataType::UInt64 => primitive_values::<UInt64Type, _>(array, |value| {
            i64::try_from(value).map_or_else(|_| SqlValue::Text(value.to_string()), SqlValue::Int)
        }),
        DataType::Float32 => primitive_values::<Float32Type, _>(array, SqlValue::from),
        DataType::Float64 => primitive_values::<Float64Type, _>(array, SqlValue::from),
        DataType::Utf8 => array.as_string::<i32>().iter().map(SqlValue::from).collect(),
        DataType::LargeUtf8 => array.as_string::<i64>().iter().map(SqlValue::from).collect(),
        DataType::Date32 => {
            let typed = array.as_primitive::<Date32Type>();
            temporal_values(typed, |i| typed.value_as_date(i).map(SqlValue::Date))
        }
        DataType::Date64 => {
            let typed = array.as_primitive::<Date64Type>();
            temporal_values(typed, |i| typed.value_as_date(i).map(SqlValue::Date))
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            let typed = array.as_primitive::<TimestampSecondType>();
            temporal_values(typed, |i| typed.value_as_datetime(i).map(SqlValue::DateTime))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let typed = array.as_primitive::<TimestampMillisecondType>();
            temporal_values(typed, |i| typed.value_as_datetime(i).map(SqlValue::DateTime))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let typed = array.as_primitive::<TimestampMicrosecondType>();
            temporal_values(typed, |i| typed.value_as_datetime(i).map(SqlValue::DateTime))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let typed = array.as_primitive::<TimestampNanosecondType>();
            temporal_values(typed, |i| typed.value_as_datetime(i).map(SqlValue::DateTime))
        }
        other => {
            // Decimals, times and dictionaries go through the Arrow string cast
            let strings = cast::cast(array, &DataType::Utf8).map_err(|e| {
                Error::Schema(format!("Cannot bind column of type {other:?}: {e}"))
            })?;
            strings.as_string::<i32>().iter().map(SqlValue::from).collect()
        }
    };

    Ok(values)
}

fn primitive_values<T, F>(array: &ArrayRef, convert: F) -> Vec<SqlValue>
where
    T: ArrowPrimitiveType,
    F: Fn(T::Native) -> SqlValue,
{
    array
        .as_primitive::<T>()
        .iter()
        .map(|value| value.map_or(SqlValue::Null, &convert))
        .collect()
}

fn temporal_values<T, F>(array: &PrimitiveArray<T>, convert: F) -> Vec<SqlValue>
where
    T: ArrowPrimitiveType,
    F: Fn(usize) -> Option<SqlValue>,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                SqlValue::Null
            } else {
                convert(i).unwrap_or(SqlValue::Null)
            }
        })
        .collect()
}
