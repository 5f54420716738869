//! Path utilities for locating part files and naming outputs.

pub mod parts;

// Re-export commonly used functions for convenience
pub use parts::{
    COMBINED_MARKER, PartPattern, combined_output_path, discover_parts, is_combined_file,
    is_combined_output, part_glob,
};
