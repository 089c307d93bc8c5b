//! CLI argument parsing using clap.

use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use pipekit_core::ArchiveFormat;
use pipekit_core::CompressionLevel;
use pipekit_core::UnpackConfig;
use pipekit_core::env_sink::EnvSinkKind;
use pipekit_core::types::EntryFilter;
use pipekit_core::types::RootPrefix;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Print the command line before running it
    #[arg(long, global = true)]
    pub echo: bool,

    /// Where resolved values are published
    #[arg(long, global = true, value_enum, default_value_t = EnvSinkArg::Auto)]
    pub env_sink: EnvSinkArg,

    /// File that receives NAME=VALUE lines with --env-sink file
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// Maps the sink flags onto the core selection.
    pub fn env_sink_kind(&self) -> Result<EnvSinkKind> {
        Ok(match self.env_sink {
            EnvSinkArg::Auto => EnvSinkKind::Auto,
            EnvSinkArg::Process => EnvSinkKind::Process,
            EnvSinkArg::Ci => EnvSinkKind::Ci,
            EnvSinkArg::File => match &self.env_file {
                Some(path) => EnvSinkKind::File(path.clone()),
                None => bail!(
                    "--env-sink file needs a target file\n\
                     HINT: Pass --env-file <FILE>."
                ),
            },
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EnvSinkArg {
    /// Process environment, plus $GITHUB_ENV if set or CI logging commands
    Auto,
    /// Process environment only
    Process,
    /// Azure Pipelines logging commands on stdout
    Ci,
    /// NAME=VALUE lines appended to --env-file
    File,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a directory or file into a new archive
    Zip(ZipArgs),
    /// Add files to a zip archive, creating it if missing
    AppendZip(AppendZipArgs),
    /// Unpack a zip archive
    Unzip(UnpackArgs),
    /// Unpack a tar.gz archive
    Untgz(UnpackArgs),
    /// Unpack a tar archive compressed with raw LZMA
    Untxz(UnpackArgs),
    /// Unpack an archive, detecting the format from its name
    Unpack(UnpackArgs),
    /// Fetch an archive into a temp file and unpack it
    FetchUnpack(FetchUnpackArgs),
    /// Resolve a path pattern and publish the single match
    ResolvePath(ResolvePathArgs),
    /// Print a host CPU or OS property
    CpuInfo(CpuInfoArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct ZipArgs {
    /// Source directory or file (pattern, must match exactly one path)
    #[arg(short, long, value_name = "PATTERN")]
    pub input: String,

    /// Output archive file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Only pack entries whose name matches this regex
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Compression level: optimal, fastest, no-compression, smallest-size
    #[arg(short = 'l', long, default_value_t = CompressionLevel::Optimal)]
    pub level: CompressionLevel,

    /// Archive format (default: from the output file name)
    #[arg(long, value_name = "zip|tgz|txz")]
    pub format: Option<ArchiveFormat>,
}

#[derive(clap::Args)]
pub struct AppendZipArgs {
    /// Source directory or file (pattern, must match exactly one path)
    #[arg(short, long, value_name = "PATTERN")]
    pub input: String,

    /// Zip archive to update or create
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Folder inside the archive that receives the entries
    #[arg(short, long, value_name = "FOLDER")]
    pub subfolder: Option<String>,

    /// Only add entries whose name matches this regex
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Compression level: optimal, fastest, no-compression, smallest-size
    #[arg(short = 'l', long, default_value_t = CompressionLevel::Optimal)]
    pub level: CompressionLevel,
}

/// Options shared by every unpacking command.
#[derive(clap::Args)]
pub struct ExtractOptions {
    /// Output directory (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Only extract entries whose name matches this regex
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Leading folder to strip from entry names
    #[arg(short, long, value_name = "FOLDER")]
    pub root: Option<String>,

    /// Replace files that already exist
    #[arg(long)]
    pub overwrite: bool,
}

impl ExtractOptions {
    /// Builds the core configuration for `format` (`None` to detect).
    pub fn config(&self, format: Option<ArchiveFormat>) -> pipekit_core::Result<UnpackConfig> {
        Ok(UnpackConfig::default()
            .with_filter(EntryFilter::optional(self.filter.as_deref())?)
            .with_root_prefix(self.root.as_deref().and_then(RootPrefix::new))
            .with_overwrite(self.overwrite)
            .with_format(format))
    }
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Archive file (pattern, must match exactly one path)
    #[arg(short, long, value_name = "PATTERN")]
    pub input: String,

    #[command(flatten)]
    pub extract: ExtractOptions,
}

#[derive(clap::Args)]
pub struct FetchUnpackArgs {
    /// Archive location: a path or file:// URL
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: String,

    /// Temp folder or file name for the fetched archive
    #[arg(short, long, value_name = "PATH")]
    pub temp: Option<PathBuf>,

    /// Archive format (default: from the URL)
    #[arg(long, value_name = "zip|tgz|txz")]
    pub format: Option<ArchiveFormat>,

    #[command(flatten)]
    pub extract: ExtractOptions,
}

#[derive(clap::Args)]
pub struct ResolvePathArgs {
    /// Path pattern (`*`, `?`, `**`)
    #[arg(short, long, value_name = "PATTERN")]
    pub input: String,

    /// Variable that receives the single resolved path
    #[arg(short = 'v', long, value_name = "NAME")]
    pub variable: Option<String>,

    /// Maximum number of matches to consider
    #[arg(short, long, value_name = "N")]
    pub take: Option<usize>,

    /// Use the containing directories of the matches
    #[arg(short, long)]
    pub directory: bool,
}

#[derive(clap::Args)]
pub struct CpuInfoArgs {
    /// Property to print
    #[arg(short, long, value_enum)]
    pub info: CpuInfo,

    /// Variable that receives the value
    #[arg(short = 'v', long, value_name = "NAME")]
    pub variable: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CpuInfo {
    /// Number of logical processors
    Count,
    /// Processor architecture (x64, arm64, ...)
    Arch,
    /// Operating system (windows, linux, osx, ...)
    Os,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_zip_with_level() {
        let cli = Cli::try_parse_from([
            "pipekit", "zip", "-i", "out", "-o", "a.zip", "-l", "no-compression",
        ])
        .unwrap();
        match cli.command {
            Commands::Zip(args) => assert_eq!(args.level, CompressionLevel::NoCompression),
            _ => panic!("expected zip"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(
            Cli::try_parse_from(["pipekit", "zip", "-i", "a", "-o", "b", "--format", "rar"]).is_err()
        );
    }

    #[test]
    fn test_env_sink_file_requires_path() {
        let cli = Cli::try_parse_from(["pipekit", "--env-sink", "file", "cpu-info", "-i", "count"])
            .unwrap();
        assert!(cli.env_sink_kind().is_err());

        let cli = Cli::try_parse_from([
            "pipekit", "--env-sink", "file", "--env-file", "env.txt", "cpu-info", "-i", "arch",
        ])
        .unwrap();
        assert_eq!(
            cli.env_sink_kind().unwrap(),
            EnvSinkKind::File(PathBuf::from("env.txt"))
        );
    }

    #[test]
    fn test_extract_options_blank_root_is_ignored() {
        let options = ExtractOptions {
            output: None,
            filter: Some(r"\.so$".to_string()),
            root: Some("/".to_string()),
            overwrite: true,
        };
        let config = options.config(None).unwrap();
        assert!(config.root_prefix.is_none());
        assert!(config.filter.is_some());
        assert!(config.overwrite);
    }
}
