//! Part file discovery
//!
//! A dataset written in fragments shares a base path prefix:
//! `sales_part_0.parquet`, `sales_part_1.parquet`, ... all match the base
//! `sales_part`. This module resolves the `<base>*.parquet` pattern against
//! the base's parent directory and names the combined output file.

use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::{Error, Result};

/// File name suffix of a combined output file
pub const COMBINED_SUFFIX: &str = "_combined.parquet";

/// Marker that identifies a combined output file; such files are never parts
pub const COMBINED_MARKER: &str = "_combined";

/// Parquet file extension, including the dot
pub const PARQUET_EXTENSION: &str = ".parquet";

/// A `<base>*.parquet` pattern split into a directory and a file name prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPattern {
    /// Directory searched for parts
    pub dir: PathBuf,
    /// File name prefix every part starts with
    pub prefix: String,
}

impl PartPattern {
    /// Split a base path prefix into the directory to scan and the name prefix
    ///
    /// A base ending in a path separator matches every Parquet file in that
    /// directory. A base without a directory component is resolved against
    /// the current directory.
    ///
    /// # Errors
    /// Returns an error if `file_base` is empty
    pub fn new(file_base: &str) -> Result<Self> {
        if file_base.is_empty() {
            return Err(Error::invalid_argument("file_base must not be empty"));
        }

        let (dir, prefix) = match file_base.rfind(std::path::is_separator) {
            Some(0) => (PathBuf::from(&file_base[..1]), &file_base[1..]),
            Some(idx) => (PathBuf::from(&file_base[..idx]), &file_base[idx + 1..]),
            None => (PathBuf::from("."), file_base),
        };

        Ok(Self {
            dir,
            prefix: prefix.to_string(),
        })
    }

    /// Whether a file name matches `<prefix>*.parquet`
    ///
    /// Like a shell glob, a bare `*` does not match hidden files.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        if self.prefix.is_empty() && file_name.starts_with('.') {
            return false;
        }
        file_name.len() >= self.prefix.len() + PARQUET_EXTENSION.len()
            && file_name.starts_with(&self.prefix)
            && file_name.ends_with(PARQUET_EXTENSION)
    }
}

/// Whether a path contains the combined-file marker anywhere
#[must_use]
pub fn is_combined_file(path: &Path) -> bool {
    path.to_string_lossy().contains(COMBINED_MARKER)
}

/// Whether a file name is a combine output, `*_combined.parquet`
#[must_use]
pub fn is_combined_output(file_name: &str) -> bool {
    file_name.ends_with(COMBINED_SUFFIX)
}

/// Path of the combined output for a base prefix: `<file_base>_combined.parquet`
#[must_use]
pub fn combined_output_path(file_base: &str) -> PathBuf {
    PathBuf::from(format!("{file_base}{COMBINED_SUFFIX}"))
}

/// Glob-style pattern string for a base prefix, used in messages
#[must_use]
pub fn part_glob(file_base: &str) -> String {
    format!("{file_base}*{PARQUET_EXTENSION}")
}

/// Find all part files matching `<file_base>*.parquet`
///
/// Combined outputs (`*_combined.parquet`) are excluded. Results are
/// sorted by file name so the first part, whose schema is authoritative,
/// is deterministic.
///
/// # Arguments
/// * `file_base` - Base path prefix shared by the parts
///
/// # Returns
/// The matching part paths, possibly empty
///
/// # Errors
/// Returns an error if `file_base` is empty or the directory cannot be read
pub fn discover_parts(file_base: &str) -> Result<Vec<PathBuf>> {
    let pattern = PartPattern::new(file_base)?;

    let entries = match std::fs::read_dir(&pattern.dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(&pattern.dir, e)),
    };

    let mut parts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&pattern.dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if path.is_file() && pattern.matches(name) && !is_combined_output(name) {
            parts.push(path);
        }
    }

    Ok(parts
        .into_iter()
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect_vec())
}
