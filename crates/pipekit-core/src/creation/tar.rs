//! TAR container writing (gzip or raw LZMA compressed).

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tar::Builder;
use tar::EntryType;
use tar::Header;

use super::PackReport;
use super::SourceEntry;
use super::plan;
use crate::ProgressCallback;
use crate::Result;
use crate::config::PackConfig;
use crate::formats::lzma;
use crate::progress::ProgressTracker;

/// Writes a gzip-compressed TAR container from collected source entries.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::NoopProgress;
/// use pipekit_core::config::PackConfig;
/// use pipekit_core::creation::tar::create_tar_gz;
/// use pipekit_core::creation::walker::collect_sources;
/// use std::fs::File;
/// use std::path::Path;
///
/// let sources = collect_sources(Path::new("dist"))?;
/// let file = File::create("out.tar.gz")?;
/// create_tar_gz(file, sources, &PackConfig::default(), &mut NoopProgress)?;
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
///
/// # Errors
///
/// Returns an error if a source file cannot be read or the container cannot
/// be written.
pub fn create_tar_gz<W: Write>(
    writer: W,
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackReport> {
    let encoder = flate2::write::GzEncoder::new(writer, config.compression.gzip());
    let (encoder, report) = create_tar_internal(encoder, sources, config, progress)?;
    encoder.finish()?;
    Ok(report)
}

/// Writes a TAR container compressed with the raw LZMA framing.
///
/// # Errors
///
/// Returns an error if a source file cannot be read or the container cannot
/// be written.
pub fn create_tar_lzma<W: Write>(
    writer: W,
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackReport> {
    let encoder = lzma::encoder(writer, config.compression.lzma_preset())?;
    let (encoder, report) = create_tar_internal(encoder, sources, config, progress)?;
    encoder.finish()?;
    Ok(report)
}

fn create_tar_internal<W: Write>(
    writer: W,
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<(W, PackReport)> {
    let start = Instant::now();
    let mut report = PackReport::new();
    let planned = plan(sources, config, HashSet::new(), &mut report);

    let mut builder = Builder::new(writer);
    let mut tracker = ProgressTracker::new(progress, planned.len());
    for entry in &planned {
        let name = Path::new(&entry.name);
        tracker.on_entry_start(name);

        if entry.is_directory() {
            let mut header = Header::new_gnu();
            header.set_metadata(&std::fs::metadata(&entry.path)?);
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            builder.append_data(&mut header, &entry.name, std::io::empty())?;
            report.directories_added += 1;
        } else {
            let file = File::open(&entry.path)?;
            let mut header = Header::new_gnu();
            header.set_metadata(&file.metadata()?);
            let mut reader = tracker.reader(file);
            builder.append_data(&mut header, &entry.name, &mut reader)?;
            report.files_added += 1;
            report.bytes_written += reader.bytes_read();
        }

        tracing::debug!("{}", entry.name);
        tracker.on_entry_complete(name);
    }
    tracker.on_complete();

    let writer = builder.into_inner()?;
    report.duration = start.elapsed();
    Ok((writer, report))
}
