//! Error types for annotation loading.

use std::path::PathBuf;
use thiserror::Error;

use hdtf_models::VideoIdError;

/// Result type for annotation operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Fatal annotation errors. Any of these aborts the whole run.
///
/// Missing cross-file correlations are not errors; the joiner filters
/// those out and only counts them.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Failed to read annotation file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed annotation {path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Cannot build job for video `{video}` ({path}:{line}): {source}")]
    VideoId {
        path: PathBuf,
        line: usize,
        video: String,
        #[source]
        source: VideoIdError,
    },
}

impl AnnotationError {
    /// Create a malformed line error.
    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Line number the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            AnnotationError::Read { .. } => None,
            AnnotationError::Malformed { line, .. }
            | AnnotationError::VideoId { line, .. } => Some(*line),
        }
    }
}
