//! Error types for glob resolution and archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PipelineError`.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while resolving paths or packing/unpacking archives.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pattern resolved to zero or several paths where exactly one was
    /// required.
    #[error("pattern {pattern} matched {} paths, expected exactly one{}", .matches.len(), preview(.matches))]
    PatternMismatch {
        /// The pattern as given by the caller.
        pattern: String,
        /// Every distinct path the pattern resolved to.
        matches: Vec<PathBuf>,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid path pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path that should lie under a base directory does not.
    #[error("{path} is not located under {base}")]
    InvalidRelation {
        /// The full path that was being normalized.
        path: PathBuf,
        /// The base directory it was expected to start with.
        base: PathBuf,
    },

    /// Archive headers are truncated or invalid.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Extraction matched no entries at all.
    #[error("no entries in {archive} matched{}", .filter.as_deref().map(|f| format!(" filter {f}")).unwrap_or_default())]
    NotFoundInContainer {
        /// The archive that was read.
        archive: PathBuf,
        /// The filter pattern that was in effect, if any.
        filter: Option<String>,
    },

    /// An archive entry name would resolve outside the destination.
    #[error("path traversal detected in entry: {entry}")]
    PathTraversal {
        /// The raw entry name from the container.
        entry: String,
    },

    /// The entry filter is not a valid regular expression.
    #[error("invalid filter regex {pattern}: {source}")]
    InvalidFilter {
        /// The filter as given.
        pattern: String,
        /// Compilation error from the regex engine.
        #[source]
        source: regex::Error,
    },

    /// Source file or directory not found.
    #[error("source path not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// Archive format could not be determined from the file name.
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat {
        /// The archive path that was inspected.
        path: PathBuf,
    },

    /// The requested combination of format and mode is not supported.
    #[error("unsupported operation: {reason}")]
    UnsupportedOperation {
        /// What was attempted.
        reason: String,
    },

    /// Configuration values are inconsistent or missing.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
    },
}

fn preview(matches: &[PathBuf]) -> String {
    match matches {
        [] => String::new(),
        [first, second, ..] => format!(": {}, {}", first.display(), second.display()),
        [only] => format!(": {}", only.display()),
    }
}

impl PipelineError {
    /// Returns `true` if the error comes from path pattern handling.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipekit_core::PipelineError;
    ///
    /// let err = PipelineError::PatternMismatch {
    ///     pattern: "/tmp/*.zip".to_string(),
    ///     matches: Vec::new(),
    /// };
    /// assert!(err.is_pattern_error());
    /// assert!(!err.is_container_error());
    /// ```
    #[must_use]
    pub const fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            Self::PatternMismatch { .. } | Self::InvalidPattern { .. }
        )
    }

    /// Returns `true` if the error describes the archive contents rather
    /// than the local filesystem.
    #[must_use]
    pub const fn is_container_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedContainer(_)
                | Self::NotFoundInContainer { .. }
                | Self::PathTraversal { .. }
                | Self::UnsupportedFormat { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipekit_core::PipelineError;
    ///
    /// let err = PipelineError::MalformedContainer("truncated header".to_string());
    /// assert_eq!(err.context(), Some("truncated header"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::MalformedContainer(msg) => Some(msg),
            Self::InvalidPattern { reason, .. }
            | Self::UnsupportedOperation { reason }
            | Self::InvalidConfiguration { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for PipelineError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::MalformedContainer(other.to_string()),
        }
    }
}
