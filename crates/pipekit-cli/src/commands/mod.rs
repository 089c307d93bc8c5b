//! Subcommand implementations.

pub mod completion;
pub mod cpu_info;
pub mod fetch;
pub mod pack;
pub mod resolve_path;
pub mod unpack;

use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use pipekit_core::EnvironmentSink;
use pipekit_core::NoopProgress;
use pipekit_core::ProgressCallback;
use pipekit_core::resolve_single;
use std::path::Path;
use std::path::PathBuf;

/// What every command gets from `main`.
pub struct Session<'a> {
    pub formatter: &'a dyn OutputFormatter,
    pub sink: &'a dyn EnvironmentSink,
    pub show_progress: bool,
}

impl Session<'_> {
    /// Runs `f` with a progress bar when one should be shown, a no-op
    /// callback otherwise.
    pub fn with_progress<T>(
        &self,
        label: &str,
        f: impl FnOnce(&mut dyn ProgressCallback) -> T,
    ) -> T {
        if self.show_progress {
            f(&mut CliProgress::new(label))
        } else {
            f(&mut NoopProgress)
        }
    }
}

/// Resolves a command input pattern to its single match.
pub fn resolve_input(pattern: &str) -> Result<PathBuf> {
    add_path_context(resolve_single(pattern), Path::new(pattern))
}
