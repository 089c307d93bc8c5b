//! `cpu-info` command implementation.

use super::Session;
use crate::cli::CpuInfo;
use crate::cli::CpuInfoArgs;
use crate::error::add_path_context;
use anyhow::Result;
use pipekit_core::PlatformIdentifier;
use pipekit_core::platform::Architecture;
use pipekit_core::platform::cpu_count;
use std::path::Path;

pub fn execute(args: &CpuInfoArgs, session: &Session<'_>) -> Result<()> {
    let value = value_of(args.info);
    let variable = args.variable.as_deref().filter(|v| !v.trim().is_empty());
    if let Some(variable) = variable {
        add_path_context(session.sink.set(variable, &value), Path::new(variable))?;
    }

    session.formatter.format_value("cpu-info", &value, variable)?;
    if let Some(variable) = variable {
        session.formatter.format_variable_set(variable, &value);
    }
    Ok(())
}

fn value_of(info: CpuInfo) -> String {
    match info {
        CpuInfo::Count => cpu_count().to_string(),
        CpuInfo::Arch => Architecture::current().to_string(),
        CpuInfo::Os => PlatformIdentifier::current().to_string(),
    }
}
