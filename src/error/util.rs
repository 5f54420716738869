//! Utility functions for error handling
//!
//! File system wrappers that attach the offending path to IO errors.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Open a file for reading, attaching the path to any error
///
/// # Arguments
/// * `path` - The path to the file to open
///
/// # Returns
/// * `Result<fs::File>` - The opened file or an error naming the path
pub fn open_file(path: &Path) -> Result<fs::File> {
    fs::File::open(path).map_err(|e| Error::io(path, e))
}

/// Create (or truncate) a file for writing, attaching the path to any error
pub fn create_file(path: &Path) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| Error::io(path, e))
}

/// Remove a file, attaching the path to any error
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}
