//! Existence checks run before a terminal file operation.
//!
//! Each guard does exactly one metadata lookup; nothing is cached between them.

use crate::errors::{io_error_with_path, StoreError, FILE_MISSING, FOLDER_MISSING};
use log::debug;
use std::fs;
use std::path::Path;

/// Passes only for an existing regular file.
pub fn require_exists(path: &Path) -> Result<(), StoreError> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => Ok(()),
        _ => {
            debug!("Guard failed, no file at {}", path.display());
            Err(StoreError::NotFound(FILE_MISSING))
        }
    }
}

/// Passes only when nothing at all exists at `path`.
///
/// A lookup that fails for any reason other than absence is not a conflict.
pub fn require_absent(path: &Path) -> Result<(), StoreError> {
    match fs::metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error_with_path(e, path)),
        Ok(_) => {
            debug!("Guard failed, {} already exists", path.display());
            Err(StoreError::Conflict)
        }
    }
}

pub fn require_directory_exists(path: &Path) -> Result<(), StoreError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => {
            debug!("Guard failed, no directory at {}", path.display());
            Err(StoreError::NotFound(FOLDER_MISSING))
        }
    }
}
