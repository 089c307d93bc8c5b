//! Per-entry extraction logic shared by the ZIP and TAR readers.
//!
//! Every entry goes through the same steps: cancellation check, root-prefix
//! stripping, filter, traversal guard, then directory creation or file
//! write with the overwrite policy applied.

use std::fs::File;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::CancellationToken;
use crate::ExtractionReport;
use crate::PipelineError;
use crate::ProgressCallback;
use crate::Result;
use crate::config::UnpackConfig;
use crate::progress::ProgressTracker;

/// What the container says an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory marker.
    Directory,
    /// Link, device or other special entry; never extracted.
    Unsupported(&'static str),
}

enum Route {
    Skip,
    Directory(PathBuf),
    File(PathBuf),
}

/// Destination side of an extraction run.
pub struct EntrySink<'a> {
    dest: &'a Path,
    config: &'a UnpackConfig,
    cancel: &'a CancellationToken,
    tracker: ProgressTracker<'a>,
    report: ExtractionReport,
    start: Instant,
}

impl<'a> EntrySink<'a> {
    /// Creates the destination directory if needed and starts the clock.
    ///
    /// `total_entries` is the container's entry count, or 0 when unknown.
    pub fn new(
        dest: &'a Path,
        config: &'a UnpackConfig,
        cancel: &'a CancellationToken,
        progress: &'a mut dyn ProgressCallback,
        total_entries: usize,
    ) -> Result<Self> {
        std::fs::create_dir_all(dest)?;
        Ok(Self {
            dest,
            config,
            cancel,
            tracker: ProgressTracker::new(progress, total_entries),
            report: ExtractionReport::new(),
            start: Instant::now(),
        })
    }

    /// Returns `false`, and marks the report, once cancellation has been
    /// requested.
    pub fn proceed(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            tracing::info!("extraction cancelled");
            self.report.cancelled = true;
            return false;
        }
        true
    }

    /// Processes one entry, reading its data from `data` if it is written.
    ///
    /// `mode` carries Unix permission bits from the container, if any.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::PathTraversal` if the entry would land outside
    /// the destination, and I/O errors from reading or writing.
    pub fn extract(
        &mut self,
        raw_name: &str,
        kind: EntryKind,
        mode: Option<u32>,
        data: &mut dyn Read,
    ) -> Result<()> {
        match self.route(raw_name, kind)? {
            Route::Skip => {}
            Route::Directory(target) => {
                let display = Path::new(raw_name);
                self.tracker.on_entry_start(display);
                std::fs::create_dir_all(&target)?;
                self.report.directories_created += 1;
                self.tracker.on_entry_complete(display);
            }
            Route::File(target) => {
                let display = Path::new(raw_name);
                self.tracker.on_entry_start(display);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&target)?;
                let written = std::io::copy(&mut self.tracker.reader(data), &mut out)?;
                apply_mode(&out, mode)?;
                tracing::debug!("extracted {}", target.display());
                self.report.files_extracted += 1;
                self.report.bytes_written += written;
                self.tracker.on_entry_complete(display);
            }
        }
        Ok(())
    }

    /// Stops the clock and returns the report.
    pub fn finish(mut self) -> ExtractionReport {
        self.tracker.on_complete();
        self.report.duration = self.start.elapsed();
        self.report
    }

    fn route(&mut self, raw_name: &str, kind: EntryKind) -> Result<Route> {
        let normalized = normalize_name(raw_name);
        let name = match &self.config.root_prefix {
            Some(prefix) => match prefix.apply(&normalized) {
                Some(name) => name,
                None => {
                    tracing::debug!("skipping {raw_name}: root marker");
                    return Ok(Route::Skip);
                }
            },
            None => normalized.as_str(),
        };

        if let Some(filter) = &self.config.filter
            && !filter.is_match(name)
        {
            tracing::debug!("skipping {name}: does not match {}", filter.as_str());
            self.report.skipped_filtered += 1;
            return Ok(Route::Skip);
        }

        let relative = safe_relative(name, raw_name)?;
        if relative.as_os_str().is_empty() {
            return Ok(Route::Skip);
        }
        let target = self.dest.join(relative);

        let kind = if name.ends_with('/') {
            EntryKind::Directory
        } else {
            kind
        };
        match kind {
            EntryKind::Directory => Ok(Route::Directory(target)),
            EntryKind::Unsupported(what) => {
                tracing::warn!("skipping {what} entry {raw_name}");
                self.report
                    .add_warning(format!("skipped {what} entry: {raw_name}"));
                Ok(Route::Skip)
            }
            EntryKind::File => {
                if !self.config.overwrite && target.exists() {
                    tracing::debug!("skipping {name}: {} exists", target.display());
                    self.report.skipped_existing += 1;
                    return Ok(Route::Skip);
                }
                Ok(Route::File(target))
            }
        }
    }
}

/// Converts backslashes to `/` and drops leading `./` segments.
fn normalize_name(raw: &str) -> String {
    let mut name = raw.replace('\\', "/");
    while let Some(rest) = name.strip_prefix("./") {
        name = rest.to_string();
    }
    name
}

/// Turns an entry name into a path that stays under the destination.
fn safe_relative(name: &str, raw_name: &str) -> Result<PathBuf> {
    let traversal = || PipelineError::PathTraversal {
        entry: raw_name.to_string(),
    };

    if name.starts_with('/') {
        return Err(traversal());
    }

    let mut relative = PathBuf::new();
    for (index, segment) in name.split('/').enumerate() {
        match segment {
            "" | "." => {}
            ".." => return Err(traversal()),
            _ if index == 0 && is_drive(segment) => return Err(traversal()),
            _ => {
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(segment),
                    _ => return Err(traversal()),
                }
            }
        }
    }
    Ok(relative)
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(unix)]
fn apply_mode(file: &File, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode.map(|m| m & 0o777)
        && mode != 0
    {
        file.set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_file: &File, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

/// Maps I/O errors raised while parsing a container to
/// `MalformedContainer` when they describe bad or missing data.
///
/// The tar reader reports short blocks as `ErrorKind::Other`, so that kind
/// counts as malformed too.
pub fn container_io(err: std::io::Error) -> PipelineError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::InvalidData
        | ErrorKind::InvalidInput
        | ErrorKind::UnexpectedEof
        | ErrorKind::Other => PipelineError::MalformedContainer(err.to_string()),
        _ => PipelineError::Io(err),
    }
}
