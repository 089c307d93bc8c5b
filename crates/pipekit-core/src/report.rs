//! Extraction reporting and progress callbacks.

use std::path::Path;
use std::time::Duration;

/// Report of an unpack operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files written to disk.
    pub files_extracted: usize,

    /// Number of directory entries materialized.
    pub directories_created: usize,

    /// Files left alone because they existed and overwrite was disabled.
    pub skipped_existing: usize,

    /// Entries that did not match the filter.
    pub skipped_filtered: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Extraction stopped early because cancellation was requested.
    pub cancelled: bool,

    /// Duration of the operation.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns the number of entries that passed the root prefix and the
    /// filter, whether or not they were written.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.files_extracted + self.directories_created + self.skipped_existing
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Callback trait for progress reporting during pack and unpack.
///
/// # Examples
///
/// ```
/// use pipekit_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// `total` is 0 when the entry count is not known up front (tar
    /// streams); `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after a chunk of entry data has been written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been completely processed.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once when the whole operation is complete.
    fn on_complete(&mut self);
}

/// `ProgressCallback` that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
