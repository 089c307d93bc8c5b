//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use pipekit_core::ExtractionReport;
use pipekit_core::PackReport;
use std::path::Path;
use std::path::PathBuf;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }

}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, output: &Path, report: &PackReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive written: {}", output.display()));
        let _ = self
            .term
            .write_line(&format!("  Files added:      {}", report.files_added));
        let _ = self
            .term
            .write_line(&format!("  Directories:      {}", report.directories_added));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        if report.skipped_existing > 0 {
            let _ = self.term.write_line(&format!(
                "  Already present:  {}",
                report.skipped_existing
            ));
        }
        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Filtered out:     {}", report.skipped_filtered));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }
        self.warnings(&report.warnings);

        Ok(())
    }

    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if report.cancelled {
            self.format_warning("Extraction cancelled");
        } else {
            self.headline(&format!("Extracted to {}", dest.display()));
        }
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));
        if report.skipped_existing > 0 {
            let _ = self.term.write_line(&format!(
                "  Kept existing: {}",
                report.skipped_existing
            ));
        }
        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Filtered out: {}", report.skipped_filtered));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }
        self.warnings(&report.warnings);

        Ok(())
    }

    fn format_paths(&self, paths: &[PathBuf], _variable: Option<&str>) -> Result<()> {
        // the paths are the command's result and print even when quiet
        for path in paths {
            self.term.write_line(&path.display().to_string())?;
        }
        Ok(())
    }

    fn format_value(&self, _operation: &str, value: &str, _variable: Option<&str>) -> Result<()> {
        self.term.write_line(value)?;
        Ok(())
    }

    fn format_variable_set(&self, name: &str, value: &str) {
        if self.quiet {
            return;
        }
        let _ = self
            .term
            .write_line(&format!("Setting environment variable {name} to {value}"));
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
