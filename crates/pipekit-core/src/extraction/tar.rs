//! TAR container extraction (gzip or raw LZMA compressed).

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use tar::EntryType;

use super::common::EntryKind;
use super::common::EntrySink;
use super::common::container_io;
use crate::CancellationToken;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::config::UnpackConfig;
use crate::formats::lzma;

/// Extracts a gzip-compressed TAR container into `dest`.
///
/// # Errors
///
/// Returns `PipelineError::MalformedContainer` for a corrupt container,
/// `PipelineError::PathTraversal` for an escaping entry name, and I/O
/// errors.
pub fn extract_tar_gz<R: Read>(
    reader: R,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    extract_tar(GzDecoder::new(reader), dest, config, cancel, progress)
}

/// Extracts a raw-LZMA TAR container into `dest`.
///
/// # Errors
///
/// Returns `PipelineError::MalformedContainer` if the 13-byte header is
/// truncated or invalid (including real `.xz` input), plus everything
/// [`extract_tar_gz`] can return.
pub fn extract_tar_lzma<R: Read>(
    reader: R,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    extract_tar(lzma::decoder(reader)?, dest, config, cancel, progress)
}

/// Extracts an uncompressed TAR stream into `dest`.
///
/// Symlinks, hardlinks and device entries are skipped with a warning.
///
/// # Errors
///
/// See [`extract_tar_gz`].
pub fn extract_tar<R: Read>(
    reader: R,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut archive = Archive::new(reader);
    let mut sink = EntrySink::new(dest, config, cancel, progress, 0)?;

    for entry in archive.entries().map_err(container_io)? {
        if !sink.proceed() {
            break;
        }
        let mut entry = entry.map_err(container_io)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let kind = match entry.header().entry_type() {
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => EntryKind::File,
            EntryType::Directory => EntryKind::Directory,
            EntryType::Symlink => EntryKind::Unsupported("symlink"),
            EntryType::Link => EntryKind::Unsupported("hardlink"),
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            _ => EntryKind::Unsupported("special"),
        };
        let mode = entry.header().mode().ok();
        sink.extract(&name, kind, mode, &mut entry)?;
    }

    Ok(sink.finish())
}
