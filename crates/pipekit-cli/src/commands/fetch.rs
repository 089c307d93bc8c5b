//! `fetch-unpack` command implementation.

use super::Session;
use super::unpack::output_dir;
use crate::cli::FetchUnpackArgs;
use crate::error::add_path_context;
use anyhow::Result;
use pipekit_core::CancellationToken;
use pipekit_core::staging::LocalFetcher;
use pipekit_core::staging::stage_and_extract;
use std::path::Path;

pub fn execute(args: &FetchUnpackArgs, session: &Session<'_>) -> Result<()> {
    let dest = output_dir(&args.extract)?;
    let subject = Path::new(&args.url);
    let config = add_path_context(args.extract.config(args.format), subject)?;

    tracing::info!("fetching {} to {}", args.url, dest.display());
    let report = add_path_context(
        session.with_progress("Unpacking", |progress| {
            stage_and_extract(
                &LocalFetcher,
                &args.url,
                args.temp.as_deref(),
                &dest,
                &config,
                &CancellationToken::new(),
                progress,
            )
        }),
        subject,
    )?;
    session.formatter.format_extraction_result(&dest, &report)
}
