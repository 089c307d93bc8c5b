//! Output formatter trait for CLI results.

use anyhow::Result;
use pipekit_core::ExtractionReport;
use pipekit_core::PackReport;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of packing into `output`
    fn format_pack_result(&self, output: &Path, report: &PackReport) -> Result<()>;

    /// Format the result of unpacking into `dest`
    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()>;

    /// Format resolved paths, and the variable that received the single one
    fn format_paths(&self, paths: &[PathBuf], variable: Option<&str>) -> Result<()>;

    /// Format a single computed value, and the variable that received it
    fn format_value(&self, operation: &str, value: &str, variable: Option<&str>) -> Result<()>;

    /// Announce that `name` now holds `value`
    fn format_variable_set(&self, name: &str, value: &str);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }
}
