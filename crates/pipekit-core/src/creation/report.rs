//! Pack operation reporting.

use std::time::Duration;

/// Report of a pack operation.
///
/// # Examples
///
/// ```
/// use pipekit_core::creation::PackReport;
///
/// let mut report = PackReport::default();
/// report.files_added = 3;
/// report.skipped_existing = 1;
/// assert_eq!(report.entries_written(), 3);
/// assert!(!report.has_warnings());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    /// Number of file entries written.
    pub files_added: usize,

    /// Number of empty-directory placeholders written.
    pub directories_added: usize,

    /// Candidates skipped because their name was already in the container.
    pub skipped_existing: usize,

    /// Candidates that did not match the filter.
    pub skipped_filtered: usize,

    /// Uncompressed bytes read from the source files.
    pub bytes_written: u64,

    /// Duration of the operation.
    pub duration: Duration,

    /// Warnings generated while packing.
    pub warnings: Vec<String>,
}

impl PackReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of entries written, files and placeholders.
    #[must_use]
    pub fn entries_written(&self) -> usize {
        self.files_added + self.directories_added
    }
}
