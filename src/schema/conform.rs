//! Conforming record batches to an authoritative schema.
//!
//! Part files written by different jobs drift: columns arrive in another
//! order, an integer column is narrower, a nullable column is missing. The
//! combiner reads every part against the first part's schema, so each batch
//! is projected, cast and null-filled here before it reaches the writer.

use std::sync::Arc;

use arrow::array::{ArrayRef, new_null_array};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Types of data type compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCompatibility {
    /// Types match exactly
    Exact,
    /// Types can be converted without losing values
    Compatible,
    /// Types are incompatible
    Incompatible,
}

/// A column that cannot be conformed to the target schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaIssue {
    /// The target field name
    pub field_name: String,
    /// Type found in the source, `None` when the column is missing
    pub source_type: Option<DataType>,
    /// Type required by the target schema
    pub target_type: DataType,
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_type {
            Some(source) => write!(
                f,
                "field '{}': {source:?} cannot be converted to {:?}",
                self.field_name, self.target_type
            ),
            None => write!(
                f,
                "field '{}' of type {:?} is missing and not nullable",
                self.field_name, self.target_type
            ),
        }
    }
}

/// Check if two Arrow data types are compatible for conversion
#[must_use]
pub fn check_type_compatibility(from: &DataType, to: &DataType) -> TypeCompatibility {
    if from == to {
        return TypeCompatibility::Exact;
    }

    match (from, to) {
        // An all-null column fits anywhere
        (DataType::Null, _) => TypeCompatibility::Compatible,

        // Numeric type conversions (widening)
        (DataType::Int8, DataType::Int16 | DataType::Int32 | DataType::Int64)
        | (DataType::Int16, DataType::Int32 | DataType::Int64)
        | (DataType::Int32, DataType::Int64)
        | (DataType::UInt8, DataType::UInt16 | DataType::UInt32 | DataType::UInt64)
        | (DataType::UInt16, DataType::UInt32 | DataType::UInt64)
        | (DataType::UInt32, DataType::UInt64)
        | (DataType::UInt8, DataType::Int16 | DataType::Int32 | DataType::Int64)
        | (DataType::UInt16, DataType::Int32 | DataType::Int64)
        | (DataType::UInt32, DataType::Int64)
        | (DataType::Float16, DataType::Float32 | DataType::Float64)
        | (DataType::Float32, DataType::Float64) => TypeCompatibility::Compatible,

        // Integer to float conversions
        (
            DataType::Int8 | DataType::Int16 | DataType::UInt8 | DataType::UInt16,
            DataType::Float32,
        )
        | (
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32,
            DataType::Float64,
        ) => TypeCompatibility::Compatible,

        // Between string types
        (DataType::Utf8, DataType::LargeUtf8) | (DataType::LargeUtf8, DataType::Utf8) => {
            TypeCompatibility::Compatible
        }
        (DataType::Binary, DataType::LargeBinary) | (DataType::LargeBinary, DataType::Binary) => {
            TypeCompatibility::Compatible
        }

        // Dictionary-encoded values read back as their value type
        (DataType::Dictionary(_, value), target) if value.as_ref() == target => {
            TypeCompatibility::Compatible
        }

        // Dates widen to any timestamp; timestamps only to a finer unit in the same zone
        (DataType::Date32, DataType::Date64 | DataType::Timestamp(_, _)) => {
            TypeCompatibility::Compatible
        }
        (DataType::Timestamp(from_unit, from_tz), DataType::Timestamp(to_unit, to_tz))
            if from_tz == to_tz && unit_rank(from_unit) <= unit_rank(to_unit) =>
        {
            TypeCompatibility::Compatible
        }

        _ => TypeCompatibility::Incompatible,
    }
}

const fn unit_rank(unit: &TimeUnit) -> u8 {
    match unit {
        TimeUnit::Second => 0,
        TimeUnit::Millisecond => 1,
        TimeUnit::Microsecond => 2,
        TimeUnit::Nanosecond => 3,
    }
}

/// List every target field the source schema cannot supply
///
/// Extra source columns are not issues; they are dropped when conforming.
#[must_use]
pub fn check_schema_compatibility(source: &Schema, target: &Schema) -> Vec<SchemaIssue> {
    target
        .fields()
        .iter()
        .filter_map(|target_field| {
            let field_name = target_field.name();
            match source.field_with_name(field_name) {
                Ok(source_field) => {
                    let source_type = source_field.data_type();
                    (check_type_compatibility(source_type, target_field.data_type())
                        == TypeCompatibility::Incompatible)
                        .then(|| SchemaIssue {
                            field_name: field_name.clone(),
                            source_type: Some(source_type.clone()),
                            target_type: target_field.data_type().clone(),
                        })
                }
                Err(_) if target_field.is_nullable() => None,
                Err(_) => Some(SchemaIssue {
                    field_name: field_name.clone(),
                    source_type: None,
                    target_type: target_field.data_type().clone(),
                }),
            }
        })
        .collect()
}

/// Convert a record batch to match the target schema
///
/// Columns are matched by name and emitted in target order. Compatible types
/// are cast, missing nullable columns become all-null columns.
///
/// # Errors
/// Returns a schema error for incompatible types or missing non-nullable
/// columns, or an Arrow error if a cast fails
pub fn conform_batch(batch: &RecordBatch, target_schema: &SchemaRef) -> Result<RecordBatch> {
    if batch.schema().as_ref() == target_schema.as_ref() {
        return Ok(batch.clone());
    }

    let source_schema = batch.schema();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(target_schema.fields().len());

    for target_field in target_schema.fields() {
        let field_name = target_field.name();
        let target_type = target_field.data_type();

        if let Ok(source_idx) = source_schema.index_of(field_name) {
            let source_array = batch.column(source_idx);
            let source_type = source_array.data_type();

            match check_type_compatibility(source_type, target_type) {
                TypeCompatibility::Exact => columns.push(Arc::clone(source_array)),
                TypeCompatibility::Compatible => {
                    columns.push(cast::cast(source_array, target_type)?);
                }
                TypeCompatibility::Incompatible => {
                    return Err(Error::Schema(format!(
                        "Incompatible types for field '{field_name}': {source_type:?} -> {target_type:?}"
                    )));
                }
            }
        } else if target_field.is_nullable() {
            columns.push(new_null_array(target_type, batch.num_rows()));
        } else {
            return Err(Error::Schema(format!(
                "Field '{field_name}' is missing and not nullable"
            )));
        }
    }

    Ok(RecordBatch::try_new(Arc::clone(target_schema), columns)?)
}
