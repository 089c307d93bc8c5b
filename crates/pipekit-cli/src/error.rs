//! Error conversion utilities for CLI.
//!
//! Converts pipekit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use pipekit_core::PipelineError;
use std::path::Path;

/// Converts `PipelineError` to a user-friendly anyhow error.
///
/// `subject` is the path the command was working on (archive, output or
/// pattern), used to anchor the message.
pub fn convert_pipeline_error(err: PipelineError, subject: &Path) -> anyhow::Error {
    match err {
        PipelineError::PatternMismatch { pattern, matches } => {
            let listed = matches
                .iter()
                .map(|m| format!("\n  {}", m.display()))
                .collect::<String>();
            anyhow!(
                "Pattern '{pattern}' matched {} paths, expected exactly one{listed}\n\
                 HINT: Make the pattern more specific, or use resolve-path to inspect matches.",
                matches.len()
            )
        }
        PipelineError::PathTraversal { entry } => {
            anyhow!(
                "Security violation: Archive '{}' contains entry '{entry}' that escapes the output directory\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                subject.display()
            )
        }
        PipelineError::NotFoundInContainer { archive, filter } => match filter {
            Some(filter) => anyhow!(
                "No entries in '{}' matched filter '{filter}'\n\
                 HINT: The filter is matched against entry names after --root is stripped.",
                archive.display()
            ),
            None => anyhow!(
                "No entries extracted from '{}'\n\
                 HINT: Check that --root names a folder present in the archive.",
                archive.display()
            ),
        },
        PipelineError::MalformedContainer(reason) => {
            anyhow!(
                "Invalid archive '{}': {reason}\n\
                 HINT: The archive may be corrupted, or its extension may not match its format.",
                subject.display()
            )
        }
        PipelineError::UnsupportedFormat { path } => {
            anyhow!(
                "Archive format not supported: {}\n\
                 HINT: Supported formats: zip, tar.gz/tgz, tar.xz/txz/tar.lzma. Use --format to override.",
                path.display()
            )
        }
        PipelineError::InvalidFilter { pattern, source } => {
            anyhow!("Invalid filter regex '{pattern}': {source}")
        }
        PipelineError::SourceNotFound { path } => {
            anyhow!("Not found: {}", path.display())
        }
        PipelineError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {io_err}", subject.display())
        }
        _ => anyhow::Error::from(err).context(format!("Error processing '{}'", subject.display())),
    }
}

/// Adds path context to a core result.
pub fn add_path_context<T>(
    result: Result<T, PipelineError>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_pipeline_error(e, subject))
}
