//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use pipekit_core::ExtractionReport;
use pipekit_core::PackReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct PackOutput {
    output_path: String,
    files_added: usize,
    directories_added: usize,
    skipped_existing: usize,
    skipped_filtered: usize,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ExtractionOutput {
    output_dir: String,
    files_extracted: usize,
    directories_created: usize,
    skipped_existing: usize,
    skipped_filtered: usize,
    bytes_written: u64,
    cancelled: bool,
    duration_ms: u128,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct PathsOutput {
    paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable: Option<String>,
}

#[derive(Serialize)]
struct ValueOutput {
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable: Option<String>,
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, output: &Path, report: &PackReport) -> Result<()> {
        let data = PackOutput {
            output_path: output.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            skipped_existing: report.skipped_existing,
            skipped_filtered: report.skipped_filtered,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };
        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        let data = ExtractionOutput {
            output_dir: dest.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            skipped_existing: report.skipped_existing,
            skipped_filtered: report.skipped_filtered,
            bytes_written: report.bytes_written,
            cancelled: report.cancelled,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };
        Self::output(&JsonOutput::success("unpack", data))
    }

    fn format_paths(&self, paths: &[PathBuf], variable: Option<&str>) -> Result<()> {
        let data = PathsOutput {
            paths: paths.iter().map(|p| p.display().to_string()).collect(),
            variable: variable.map(str::to_string),
        };
        Self::output(&JsonOutput::success("resolve-path", data))
    }

    fn format_value(&self, operation: &str, value: &str, variable: Option<&str>) -> Result<()> {
        let data = ValueOutput {
            value: value.to_string(),
            variable: variable.map(str::to_string),
        };
        Self::output(&JsonOutput::success(operation, data))
    }

    fn format_variable_set(&self, _name: &str, _value: &str) {
        // the envelope already names the variable
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
