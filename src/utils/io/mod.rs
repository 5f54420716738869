//! IO utilities for file operations
//!
//! This module provides utilities for working with part file paths and
//! Parquet files.

pub mod parquet;
pub mod paths;

// Re-export commonly used functions for convenience
pub use parquet::{DEFAULT_READ_BATCH_SIZE, open_batch_reader, parquet_shape, read_schema};
pub use paths::{combined_output_path, discover_parts};
