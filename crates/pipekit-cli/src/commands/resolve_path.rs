//! `resolve-path` command implementation.

use super::Session;
use crate::cli::ResolvePathArgs;
use crate::error::add_path_context;
use crate::error::convert_pipeline_error;
use anyhow::Result;
use pipekit_core::PipelineError;
use pipekit_core::resolve_paths;
use std::path::Path;
use std::path::PathBuf;

pub fn execute(args: &ResolvePathArgs, session: &Session<'_>) -> Result<()> {
    let subject = Path::new(&args.input);
    let matches = add_path_context(resolve_paths(&args.input), subject)?;
    let listed = select(matches, args.take, args.directory);

    let variable = args.variable.as_deref().filter(|v| !v.trim().is_empty());
    if listed.len() != 1 {
        session.formatter.format_paths(&listed, None)?;
        return Err(convert_pipeline_error(
            PipelineError::PatternMismatch {
                pattern: args.input.clone(),
                matches: listed,
            },
            subject,
        ));
    }

    let value = listed[0].display().to_string();
    if let Some(variable) = variable {
        add_path_context(session.sink.set(variable, &value), subject)?;
    }
    session.formatter.format_paths(&listed, variable)?;
    if let Some(variable) = variable {
        session.formatter.format_variable_set(variable, &value);
    }
    Ok(())
}

/// Keeps the first `take` matches, then optionally maps them to their
/// distinct parent directories in first-seen order.
fn select(matches: Vec<PathBuf>, take: Option<usize>, directories: bool) -> Vec<PathBuf> {
    let taken = matches.into_iter().take(take.unwrap_or(usize::MAX));
    if !directories {
        return taken.collect();
    }
    let mut parents: Vec<PathBuf> = Vec::new();
    for path in taken {
        let parent = path.parent().map_or_else(|| path.clone(), Path::to_path_buf);
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }
    parents
}
