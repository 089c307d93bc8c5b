//! ZIP container extraction.

use std::io::Read;
use std::io::Seek;
use std::path::Path;

use zip::ZipArchive;

use super::common::EntryKind;
use super::common::EntrySink;
use crate::CancellationToken;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::config::UnpackConfig;

/// Extracts a ZIP container into `dest`.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::CancellationToken;
/// use pipekit_core::NoopProgress;
/// use pipekit_core::config::UnpackConfig;
/// use pipekit_core::extraction::zip::extract_zip;
/// use std::fs::File;
/// use std::path::Path;
///
/// let file = File::open("tools.zip")?;
/// let report = extract_zip(
///     file,
///     Path::new("out"),
///     &UnpackConfig::default(),
///     &CancellationToken::new(),
///     &mut NoopProgress,
/// )?;
/// println!("{} files", report.files_extracted);
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
///
/// # Errors
///
/// Returns `PipelineError::MalformedContainer` for a corrupt container,
/// `PipelineError::PathTraversal` for an escaping entry name, and I/O
/// errors.
pub fn extract_zip<R: Read + Seek>(
    reader: R,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut archive = ZipArchive::new(reader)?;
    let mut sink = EntrySink::new(dest, config, cancel, progress, archive.len())?;

    for index in 0..archive.len() {
        if !sink.proceed() {
            break;
        }
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let kind = if entry.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let mode = entry.unix_mode();
        sink.extract(&name, kind, mode, &mut entry)?;
    }

    Ok(sink.finish())
}
