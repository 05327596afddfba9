use crate::errors::{io_error_with_path, StoreError};
use crate::models::{FileLocation, RequestContent};
use log::debug;
use path_clean::PathClean;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Extension appended to every file-shaped location.
pub const CONTENT_EXTENSION: &str = ".txt";

/// Maps a request path onto the store rooted at `root_dir`.
///
/// The prefix is stripped verbatim; a path outside the prefix is a routing
/// failure. Relative roots are anchored to the working directory at the time
/// of the call. The suffix is cleaned as a rooted path before joining, so the
/// result always stays under the root. Never touches the store itself.
pub fn resolve(root_dir: &Path, path_prefix: &str, request_path: &str) -> Result<FileLocation, StoreError> {
    let suffix = request_path
        .strip_prefix(path_prefix)
        .ok_or(StoreError::Routing)?;
    let root = absolute_root(root_dir)?;

    let cleaned = Path::new("/").join(suffix).clean();
    let relative = cleaned.strip_prefix("/").unwrap_or(&cleaned);

    // `a/..` cleans to nothing; treat it as the root directory rather than `<root>.txt`.
    let is_directory_shaped =
        suffix.is_empty() || suffix.ends_with('/') || relative.as_os_str().is_empty();

    let joined = if relative.as_os_str().is_empty() {
        root
    } else {
        root.join(relative)
    };
    let mut absolute = joined.into_os_string();
    if is_directory_shaped {
        if !absolute.to_string_lossy().ends_with(MAIN_SEPARATOR) {
            absolute.push(MAIN_SEPARATOR.to_string());
        }
    } else {
        absolute.push(CONTENT_EXTENSION);
    }

    let location = FileLocation {
        absolute_path: PathBuf::from(absolute),
        is_directory_shaped,
    };
    debug!("Resolved '{}' to {}", request_path, location.absolute_path.display());
    Ok(location)
}

fn absolute_root(root_dir: &Path) -> Result<PathBuf, StoreError> {
    if root_dir.is_relative() {
        let cwd = env::current_dir()
            .map_err(|e| StoreError::Unexpected(format!("Failed to read working directory: {}", e)))?;
        Ok(cwd.join(root_dir).clean())
    } else {
        Ok(root_dir.to_path_buf().clean())
    }
}

pub fn read_content(path: &Path) -> Result<RequestContent, StoreError> {
    let bytes = fs::read(path).map_err(|e| io_error_with_path(e, path))?;
    Ok(RequestContent {
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Writes a new file, creating parent directories as needed.
///
/// If the write fails after the file was created, the file is removed again.
pub fn create_file(path: &Path, content: &RequestContent) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| io_error_with_path(e, path))?;
    if let Err(e) = file.write_all(content.text.as_bytes()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(io_error_with_path(e, path));
    }
    Ok(())
}

pub fn overwrite_file(path: &Path, content: &RequestContent) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| io_error_with_path(e, path))?;
    file.write_all(content.text.as_bytes())
        .map_err(|e| io_error_with_path(e, path))
}

pub fn remove_file(path: &Path) -> Result<(), StoreError> {
    fs::remove_file(path).map_err(|e| io_error_with_path(e, path))
}
