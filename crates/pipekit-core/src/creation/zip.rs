//! ZIP container writing.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::PackReport;
use super::PlannedEntry;
use super::SourceEntry;
use super::plan;
use crate::ProgressCallback;
use crate::Result;
use crate::config::PackConfig;
use crate::progress::ProgressTracker;

/// Writes a new ZIP container from collected source entries.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::NoopProgress;
/// use pipekit_core::config::PackConfig;
/// use pipekit_core::creation::zip::create_zip;
/// use pipekit_core::creation::walker::collect_sources;
/// use std::fs::File;
/// use std::path::Path;
///
/// let sources = collect_sources(Path::new("dist"))?;
/// let file = File::create("out.zip")?;
/// let report = create_zip(file, sources, &PackConfig::default(), &mut NoopProgress)?;
/// println!("{} files", report.files_added);
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
///
/// # Errors
///
/// Returns an error if a source file cannot be read or the container cannot
/// be written.
pub fn create_zip<W: Write + Seek>(
    writer: W,
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackReport> {
    let start = Instant::now();
    let mut report = PackReport::new();
    let planned = plan(sources, config, HashSet::new(), &mut report);

    let mut zip = ZipWriter::new(writer);
    write_entries(&mut zip, &planned, config, &mut report, progress)?;
    zip.finish()?;

    report.duration = start.elapsed();
    Ok(report)
}

/// Adds collected source entries to the existing ZIP container in `file`.
///
/// Entries whose name is already present are skipped; existing entries are
/// never rewritten.
///
/// # Errors
///
/// Returns `PipelineError::MalformedContainer` if `file` is not a readable
/// ZIP container, and I/O errors from the source or the container.
pub fn append_zip<F: Read + Write + Seek>(
    mut file: F,
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackReport> {
    let start = Instant::now();
    let existing: HashSet<String> = {
        let archive = ZipArchive::new(&mut file)?;
        archive.file_names().map(str::to_string).collect()
    };

    let mut report = PackReport::new();
    let planned = plan(sources, config, existing, &mut report);

    let mut zip = ZipWriter::new_append(file)?;
    write_entries(&mut zip, &planned, config, &mut report, progress)?;
    zip.finish()?;

    report.duration = start.elapsed();
    Ok(report)
}

fn write_entries<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    planned: &[PlannedEntry],
    config: &PackConfig,
    report: &mut PackReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let options = match config.compression.zip_level() {
        None => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        Some(level) => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level)),
    };

    let mut tracker = ProgressTracker::new(progress, planned.len());
    for entry in planned {
        let name = Path::new(&entry.name);
        tracker.on_entry_start(name);

        if entry.is_directory() {
            zip.add_directory(entry.name.as_str(), options)?;
            report.directories_added += 1;
        } else {
            let mut file = File::open(&entry.path)?;
            let file_options = with_permissions(options, &file)?
                .large_file(entry.size >= u64::from(u32::MAX));
            zip.start_file(entry.name.as_str(), file_options)?;
            let written = std::io::copy(&mut tracker.reader(&mut file), zip)?;
            report.files_added += 1;
            report.bytes_written += written;
        }

        tracing::debug!("{}", entry.name);
        tracker.on_entry_complete(name);
    }
    tracker.on_complete();
    Ok(())
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, file: &File) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(options.unix_permissions(file.metadata()?.permissions().mode()))
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _file: &File) -> Result<SimpleFileOptions> {
    Ok(options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::creation::walker::collect_sources;
    use crate::config::CompressionLevel;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_create_zip_writes_files_and_empty_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/empty")).unwrap();
        fs::write(temp.path().join("a/b.txt"), "bee").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        let report = create_zip(
            &mut buffer,
            collect_sources(temp.path()).unwrap(),
            &PackConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.files_added, 1);
        assert_eq!(report.directories_added, 1);
        assert_eq!(report.bytes_written, 3);
        let bytes = buffer.into_inner();
        assert_eq!(entry_names(&bytes), vec!["a/b.txt", "a/empty/"]);
        assert_eq!(read_entry(&bytes, "a/b.txt"), "bee");
    }

    #[test]
    fn test_create_zip_stored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("plain.txt"), "plain text").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        let config = PackConfig::default().with_compression(CompressionLevel::NoCompression);
        create_zip(
            &mut buffer,
            collect_sources(temp.path()).unwrap(),
            &config,
            &mut NoopProgress,
        )
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        let entry = archive.by_name("plain.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_append_zip_keeps_existing_bytes() {
        let first = TempDir::new().unwrap();
        fs::write(first.path().join("a.txt"), "original").unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("a.txt"), "replacement").unwrap();
        fs::write(second.path().join("b.txt"), "new").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        create_zip(
            &mut buffer,
            collect_sources(first.path()).unwrap(),
            &PackConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        let report = append_zip(
            &mut buffer,
            collect_sources(second.path()).unwrap(),
            &PackConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();
        assert_eq!(report.files_added, 1);
        assert_eq!(report.skipped_existing, 1);

        let bytes = buffer.into_inner();
        assert_eq!(entry_names(&bytes), vec!["a.txt", "b.txt"]);
        assert_eq!(read_entry(&bytes, "a.txt"), "original");
        assert_eq!(read_entry(&bytes, "b.txt"), "new");
    }

    #[test]
    fn test_append_zip_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        let mut buffer = Cursor::new(b"definitely not a zip".to_vec());
        let err = append_zip(
            &mut buffer,
            collect_sources(temp.path()).unwrap(),
            &PackConfig::default(),
            &mut NoopProgress,
        )
        .unwrap_err();
        assert!(err.is_container_error());
    }
}
