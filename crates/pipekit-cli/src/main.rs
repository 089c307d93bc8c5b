//! Pipekit CLI - pack, unpack and path helpers for build pipelines.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use commands::Session;
use pipekit_core::ArchiveFormat;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if cli.echo {
        let line: Vec<String> = std::env::args().collect();
        eprintln!("{}", line.join(" "));
    }

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let github_env = std::env::var_os("GITHUB_ENV").map(PathBuf::from);
    let sink = cli
        .env_sink_kind()?
        .build(github_env, cli.json)
        .map_err(|e| {
            anyhow::anyhow!("{e}\nHINT: Use --env-sink process or --env-sink file with --json.")
        })?;
    let session = Session {
        formatter: &*formatter,
        sink: &*sink,
        show_progress: !cli.json && !cli.quiet && progress::CliProgress::should_show(),
    };

    match &cli.command {
        cli::Commands::Zip(args) => commands::pack::execute_zip(args, &session),
        cli::Commands::AppendZip(args) => commands::pack::execute_append(args, &session),
        cli::Commands::Unzip(args) => {
            commands::unpack::execute(args, Some(ArchiveFormat::Zip), &session)
        }
        cli::Commands::Untgz(args) => {
            commands::unpack::execute(args, Some(ArchiveFormat::TarGz), &session)
        }
        cli::Commands::Untxz(args) => {
            commands::unpack::execute(args, Some(ArchiveFormat::TarLzma), &session)
        }
        cli::Commands::Unpack(args) => commands::unpack::execute(args, None, &session),
        cli::Commands::FetchUnpack(args) => commands::fetch::execute(args, &session),
        cli::Commands::ResolvePath(args) => commands::resolve_path::execute(args, &session),
        cli::Commands::CpuInfo(args) => commands::cpu_info::execute(args, &session),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}
