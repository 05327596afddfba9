//! Error taxonomy for the store.
//!
//! Every stage of the request pipeline returns a [`StoreError`]. Guard-level
//! kinds carry a fixed, user-safe message; `Io` and `Unexpected` are only
//! rendered in full when verbose errors are enabled.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::{error, warn};
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The request path does not start with the configured prefix.
    #[error("Not found")]
    Routing,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Bad request, invalid content-type")]
    UnsupportedMediaType,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Folder does not exist")]
    NotADirectory,

    /// A file is present where absence was required.
    #[error("File does exist")]
    Conflict,

    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Unexpected(String),
}

pub const NO_CONTENT: &str = "Bad request, no content";
pub const PARSE_FAILED: &str = "Bad request, json parse failed";
pub const DIRECTORY_PATH: &str = "Bad request, path names a directory";
pub const TOO_LARGE: &str = "Bad request, content too large";
pub const BODY_READ_FAILED: &str = "Bad request, body read failed";
pub const FILE_MISSING: &str = "File does not exist";
pub const FOLDER_MISSING: &str = "Folder does not exist";

const GENERIC_INTERNAL: &str = "Internal server error";

/// Wraps an I/O failure with the path it happened on.
pub fn io_error_with_path<P: AsRef<std::path::Path>>(source: std::io::Error, path: P) -> StoreError {
    StoreError::Io {
        path: path.as_ref().display().to_string(),
        source,
    }
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Routing => StatusCode::NOT_FOUND,
            StoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            StoreError::NotFound(_) | StoreError::NotADirectory => StatusCode::NOT_FOUND,
            StoreError::Conflict => StatusCode::FORBIDDEN,
            StoreError::Io { .. } | StoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unexpected(_))
    }

    /// Message placed in the `Error` field of the response envelope.
    pub fn public_message(&self, verbose: bool) -> String {
        if !self.is_unexpected() {
            return self.to_string();
        }
        if verbose {
            format!("Unexpected error: {}", self)
        } else {
            GENERIC_INTERNAL.to_string()
        }
    }

    /// Logs the failure and renders it as `{"Error": ...}`.
    pub fn to_response(&self, verbose: bool) -> HttpResponse {
        if self.is_unexpected() {
            error!("Unexpected error: {:?}", self);
        } else {
            warn!("Request rejected ({}): {}", self.status_code(), self);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.public_message(verbose),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::Routing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StoreError::BadRequest(NO_CONTENT).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(StoreError::UnsupportedMediaType.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(StoreError::NotFound(FILE_MISSING).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StoreError::NotADirectory.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StoreError::Conflict.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            StoreError::Unexpected("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_guard_messages_ignore_verbosity() {
        let err = StoreError::Conflict;
        assert_eq!(err.public_message(true), "File does exist");
        assert_eq!(err.public_message(false), "File does exist");
    }

    #[test]
    fn test_unexpected_message_verbosity() {
        let err = io_error_with_path(io::Error::new(io::ErrorKind::PermissionDenied, "denied"), "/tmp/x.txt");
        assert!(err.is_unexpected());
        assert_eq!(err.public_message(false), "Internal server error");
        let verbose = err.public_message(true);
        assert!(verbose.starts_with("Unexpected error: "));
        assert!(verbose.contains("/tmp/x.txt"));
        assert!(verbose.contains("denied"));
    }
}
