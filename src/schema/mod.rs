//! Schema handling for combining Parquet part files.

pub mod conform;

pub use conform::{
    SchemaIssue, TypeCompatibility, check_schema_compatibility, check_type_compatibility,
    conform_batch,
};
