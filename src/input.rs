//! Validation and loading of the dump file given on the command line.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default upper bound on input size (10 MiB)
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// File extensions accepted as dump input
pub const ACCEPTED_EXTENSIONS: &[&str] = &["sql", "txt"];

/// Problems detected before any section is sent to a rewriter
#[derive(Error, Debug)]
pub enum InputError {
    #[error("file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("unsupported file type: {0} (expected .sql or .txt)")]
    UnsupportedExtension(PathBuf),

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is not valid UTF-8: {0}")]
    NotUtf8(PathBuf),

    #[error("no structure or COPY data found in input")]
    NoSections,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check extension and size, returning the file size in bytes
pub fn validate_path(path: &Path, max_size: u64) -> Result<u64, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let accepted = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()));
    if !accepted {
        return Err(InputError::UnsupportedExtension(path.to_path_buf()));
    }

    let size = fs::metadata(path)?.len();
    if size > max_size {
        return Err(InputError::TooLarge {
            size,
            limit: max_size,
        });
    }

    Ok(size)
}

/// Validate and read a dump file as UTF-8 text
pub fn read_dump(path: &Path, max_size: u64) -> Result<String, InputError> {
    validate_path(path, max_size)?;
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| InputError::NotUtf8(path.to_path_buf()))
}

/// File name used in the provenance header
pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
