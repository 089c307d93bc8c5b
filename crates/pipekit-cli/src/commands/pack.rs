//! `zip` and `append-zip` command implementations.

use super::Session;
use super::resolve_input;
use crate::cli::AppendZipArgs;
use crate::cli::ZipArgs;
use crate::error::add_path_context;
use anyhow::Result;
use pipekit_core::ArchiveFormat;
use pipekit_core::PackConfig;
use pipekit_core::PackMode;
use pipekit_core::pack;
use pipekit_core::types::EntryFilter;
use std::path::Path;

pub fn execute_zip(args: &ZipArgs, session: &Session<'_>) -> Result<()> {
    let input = resolve_input(&args.input)?;
    let config = PackConfig::default()
        .with_filter(add_path_context(
            EntryFilter::optional(args.filter.as_deref()),
            &args.output,
        )?)
        .with_compression(args.level)
        .with_format(args.format);
    run(&input, &args.output, &config, session)
}

pub fn execute_append(args: &AppendZipArgs, session: &Session<'_>) -> Result<()> {
    let input = resolve_input(&args.input)?;
    let config = PackConfig::default()
        .with_mode(PackMode::Append)
        .with_subfolder(args.subfolder.clone())
        .with_filter(add_path_context(
            EntryFilter::optional(args.filter.as_deref()),
            &args.output,
        )?)
        .with_compression(args.level)
        .with_format(Some(ArchiveFormat::Zip));
    run(&input, &args.output, &config, session)
}

fn run(input: &Path, output: &Path, config: &PackConfig, session: &Session<'_>) -> Result<()> {
    let report = add_path_context(
        session.with_progress("Packing", |progress| pack(input, output, config, progress)),
        output,
    )?;
    session.formatter.format_pack_result(output, &report)
}
