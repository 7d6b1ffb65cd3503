//! Error types for pipeline stages and request construction.
use std::path::PathBuf;

use crate::tools::Tool;

/// Failures that end a pipeline run at a stage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{what} not found: {}", path.display())]
    Precondition { what: &'static str, path: PathBuf },

    #[error("invalid document {}: {reason}", path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("{tool} could not be launched ({program}): {reason}")]
    Launch {
        tool: Tool,
        program: String,
        reason: String,
    },

    #[error("{tool} process failed with {status}")]
    ToolFailed { tool: Tool, status: String },

    #[error("malformed class file {}: {reason}", path.display())]
    ClassFormat { path: PathBuf, reason: String },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StageError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Rejections raised while building a [`crate::request::PipelineRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("both an existing model and subject/config inputs were given")]
    ConflictingModes,

    #[error("neither an existing model nor subject/config inputs were given")]
    MissingMode,

    #[error("expected {expected} positional arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("target symbol must not be empty")]
    EmptyTarget,
}
