//! Composes path resolution, guards, body decoding and the terminal action
//! into the store operations.
//!
//! Each operation is an ordered list of [`Stage`]s run against a
//! [`RequestContext`] with early exit on the first failure.

use crate::config::StoreConfig;
use crate::content;
use crate::errors::{StoreError, DIRECTORY_PATH};
use crate::file_system::{self, resolve};
use crate::guards;
use crate::models::{DirectoryStatistics, FileLocation, RequestContent};
use crate::statistics;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Modify,
    Remove,
    Retrieve,
    Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    RequireFileShaped,
    RequireExists,
    RequireAbsent,
    RequireDirectoryExists,
    DecodeContent,
}

/// The raw parts of a request the pipeline needs. The body is already fully read.
#[derive(Debug, Default)]
pub struct IncomingRequest {
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Set when the body could not be taken in; raised by the decode stage.
    pub body_rejection: Option<&'static str>,
}

/// Values produced by earlier stages for later ones.
#[derive(Debug)]
pub struct RequestContext {
    pub location: FileLocation,
    pub content: Option<RequestContent>,
}

#[derive(Debug)]
pub enum Outcome {
    Done,
    Content(RequestContent),
    Statistics(DirectoryStatistics),
}

impl Operation {
    fn stages(self) -> &'static [Stage] {
        match self {
            Operation::Create => &[Stage::RequireFileShaped, Stage::RequireAbsent, Stage::DecodeContent],
            Operation::Modify => &[Stage::RequireExists, Stage::DecodeContent],
            Operation::Remove | Operation::Retrieve => &[Stage::RequireExists],
            Operation::Statistics => &[Stage::RequireDirectoryExists],
        }
    }

    /// A read of a directory-shaped location is a statistics request.
    pub fn for_read(location: &FileLocation) -> Operation {
        if location.is_directory_shaped {
            Operation::Statistics
        } else {
            Operation::Retrieve
        }
    }

    fn finish(self, ctx: RequestContext) -> Result<Outcome, StoreError> {
        let path = ctx.location.absolute_path.as_path();
        match self {
            Operation::Create => {
                file_system::create_file(path, ctx.require_content()?)?;
                Ok(Outcome::Done)
            }
            Operation::Modify => {
                file_system::overwrite_file(path, ctx.require_content()?)?;
                Ok(Outcome::Done)
            }
            Operation::Remove => {
                file_system::remove_file(path)?;
                Ok(Outcome::Done)
            }
            Operation::Retrieve => Ok(Outcome::Content(file_system::read_content(path)?)),
            Operation::Statistics => Ok(Outcome::Statistics(statistics::compute_for_directory(path)?)),
        }
    }
}

impl Stage {
    fn apply(self, ctx: &mut RequestContext, request: &IncomingRequest) -> Result<(), StoreError> {
        let path = ctx.location.absolute_path.as_path();
        match self {
            Stage::RequireFileShaped if ctx.location.is_directory_shaped => {
                Err(StoreError::BadRequest(DIRECTORY_PATH))
            }
            Stage::RequireFileShaped => Ok(()),
            Stage::RequireExists => guards::require_exists(path),
            Stage::RequireAbsent => guards::require_absent(path),
            Stage::RequireDirectoryExists => guards::require_directory_exists(path),
            Stage::DecodeContent => {
                let content_type = request.content_type.as_deref();
                if let Some(reason) = request.body_rejection {
                    content::validate_content_type(content_type)?;
                    return Err(StoreError::BadRequest(reason));
                }
                ctx.content = Some(content::decode(content_type, &request.body)?);
                Ok(())
            }
        }
    }
}

impl RequestContext {
    fn require_content(&self) -> Result<&RequestContent, StoreError> {
        self.content
            .as_ref()
            .ok_or_else(|| StoreError::Unexpected("content was not decoded before the write".to_string()))
    }
}

/// Resolves the request path and runs `operation` to completion.
///
/// `Retrieve` is redirected to `Statistics` for directory-shaped paths.
pub fn run(operation: Operation, config: &StoreConfig, request: &IncomingRequest) -> Result<Outcome, StoreError> {
    let location = resolve(&config.root_dir, &config.path_prefix, &request.path)?;
    let operation = match operation {
        Operation::Retrieve | Operation::Statistics => Operation::for_read(&location),
        other => other,
    };
    debug!("{:?} {}", operation, location.absolute_path.display());

    let mut ctx = RequestContext {
        location,
        content: None,
    };
    for stage in operation.stages() {
        stage.apply(&mut ctx, request)?;
    }
    operation.finish(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TOO_LARGE;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const JSON: &str = "application/json; charset=utf-8";

    fn store() -> (TempDir, StoreConfig) {
        let temp = tempdir().unwrap();
        let config = StoreConfig {
            root_dir: temp.path().to_path_buf(),
            path_prefix: "/".to_string(),
            ..StoreConfig::default()
        };
        (temp, config)
    }

    fn with_body(path: &str, text: &str) -> IncomingRequest {
        IncomingRequest {
            path: path.to_string(),
            content_type: Some(JSON.to_string()),
            body: serde_json::to_vec(&serde_json::json!({ "Content": text })).unwrap(),
            body_rejection: None,
        }
    }

    fn bare(path: &str) -> IncomingRequest {
        IncomingRequest {
            path: path.to_string(),
            ..IncomingRequest::default()
        }
    }

    #[test]
    fn test_create_then_retrieve_round_trip() {
        let (temp, config) = store();
        let text = "Hello world, A test\ntext with new line\n3456";
        assert!(matches!(run(Operation::Create, &config, &with_body("/docs/test", text)), Ok(Outcome::Done)));
        assert_eq!(fs::read_to_string(temp.path().join("docs/test.txt")).unwrap(), text);

        match run(Operation::Retrieve, &config, &bare("/docs/test")).unwrap() {
            Outcome::Content(content) => assert_eq!(content.text, text),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_create_twice_conflicts() {
        let (_temp, config) = store();
        run(Operation::Create, &config, &with_body("/test", "a")).unwrap();
        assert!(matches!(
            run(Operation::Create, &config, &with_body("/test", "b")),
            Err(StoreError::Conflict)
        ));
    }

    #[test]
    fn test_guard_runs_before_content_checks() {
        let (temp, config) = store();
        fs::write(temp.path().join("test.txt"), "x").unwrap();
        let request = IncomingRequest {
            path: "/test".to_string(),
            content_type: Some("text/plain".to_string()),
            body: Vec::new(),
            body_rejection: None,
        };
        assert!(matches!(run(Operation::Create, &config, &request), Err(StoreError::Conflict)));
        assert!(matches!(
            run(Operation::Modify, &config, &request),
            Err(StoreError::UnsupportedMediaType)
        ));
    }

    #[test]
    fn test_create_on_directory_path_rejected() {
        let (_temp, config) = store();
        assert!(matches!(
            run(Operation::Create, &config, &with_body("/docs/", "a")),
            Err(StoreError::BadRequest(DIRECTORY_PATH))
        ));
    }

    #[test]
    fn test_missing_file_operations_not_found() {
        let (_temp, config) = store();
        for op in [Operation::Modify, Operation::Remove, Operation::Retrieve] {
            assert!(
                matches!(run(op, &config, &with_body("/missing", "a")), Err(StoreError::NotFound(_))),
                "{:?}",
                op
            );
        }
    }

    #[test]
    fn test_modify_and_remove() {
        let (temp, config) = store();
        let file = temp.path().join("test.txt");
        fs::write(&file, "hello").unwrap();

        run(Operation::Modify, &config, &with_body("/test", "new")).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");

        run(Operation::Remove, &config, &bare("/test")).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_read_of_directory_path_gives_statistics() {
        let (temp, config) = store();
        fs::write(temp.path().join("a.txt"), "hi hi").unwrap();
        fs::write(temp.path().join("b.txt"), "world").unwrap();
        match run(Operation::Retrieve, &config, &bare("/")).unwrap() {
            Outcome::Statistics(stats) => assert_eq!(stats.file_count, 2),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(
            run(Operation::Retrieve, &config, &bare("/nope/")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_prefix_mismatch_is_routing_error() {
        let (_temp, mut config) = store();
        config.path_prefix = "/api".to_string();
        assert!(matches!(
            run(Operation::Retrieve, &config, &bare("/other/x")),
            Err(StoreError::Routing)
        ));
    }

    #[test]
    fn test_rejected_body_surfaces_after_guards() {
        let (temp, config) = store();
        fs::write(temp.path().join("x.txt"), "x").unwrap();
        let rejected = |path: &str| IncomingRequest {
            path: path.to_string(),
            content_type: Some(JSON.to_string()),
            body: Vec::new(),
            body_rejection: Some(TOO_LARGE),
        };
        assert!(matches!(run(Operation::Create, &config, &rejected("/x")), Err(StoreError::Conflict)));
        assert!(matches!(
            run(Operation::Modify, &config, &rejected("/missing")),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            run(Operation::Modify, &config, &rejected("/x")),
            Err(StoreError::BadRequest(TOO_LARGE))
        ));
        assert!(matches!(
            run(Operation::Create, &config, &rejected("/fresh")),
            Err(StoreError::BadRequest(TOO_LARGE))
        ));
        assert!(!temp.path().join("fresh.txt").exists());
    }
}
