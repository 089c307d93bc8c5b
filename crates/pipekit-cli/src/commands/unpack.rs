//! `unzip`, `untgz`, `untxz` and `unpack` command implementations.

use super::Session;
use super::resolve_input;
use crate::cli::ExtractOptions;
use crate::cli::UnpackArgs;
use crate::error::add_path_context;
use anyhow::Context;
use anyhow::Result;
use pipekit_core::ArchiveFormat;
use pipekit_core::CancellationToken;
use pipekit_core::unpack;
use std::env;
use std::path::PathBuf;

/// Unpacks with a fixed `format`, or detects it from the name when `None`.
pub fn execute(
    args: &UnpackArgs,
    format: Option<ArchiveFormat>,
    session: &Session<'_>,
) -> Result<()> {
    let archive = resolve_input(&args.input)?;
    let dest = output_dir(&args.extract)?;
    let config = add_path_context(args.extract.config(format), &archive)?;

    let report = add_path_context(
        session.with_progress("Unpacking", |progress| {
            unpack(&archive, &dest, &config, &CancellationToken::new(), progress)
        }),
        &archive,
    )?;
    session.formatter.format_extraction_result(&dest, &report)
}

pub fn output_dir(options: &ExtractOptions) -> Result<PathBuf> {
    match &options.output {
        Some(dir) => Ok(dir.clone()),
        None => env::current_dir().context("failed to get current directory"),
    }
}
