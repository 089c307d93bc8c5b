//! High-level path-based API for packing and unpacking.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::CancellationToken;
use crate::ExtractionReport;
use crate::PipelineError;
use crate::ProgressCallback;
use crate::Result;
use crate::config::PackConfig;
use crate::config::PackMode;
use crate::config::UnpackConfig;
use crate::creation;
use crate::creation::PackReport;
use crate::creation::SourceEntry;
use crate::creation::walker::collect_sources;
use crate::extraction;
use crate::formats::ArchiveFormat;
use crate::paths::absolutize;

/// Packs `source` (a directory or a single file) into the container at
/// `output`.
///
/// The format comes from `config.format` or the output file name. In
/// `Create` mode the container is written to a temporary file next to
/// `output` and moved into place once finalized, so a failure leaves no
/// partial output. In `Append` mode an existing container is updated in
/// place; if `output` does not exist yet it is created.
///
/// # Errors
///
/// Returns an error if:
/// - the format cannot be determined or does not support `Append`
/// - the configuration is invalid
/// - `source` does not exist or cannot be read
/// - the existing container is malformed (append)
/// - the output cannot be written
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::NoopProgress;
/// use pipekit_core::config::PackConfig;
/// use pipekit_core::pack;
/// use std::path::Path;
///
/// let report = pack(
///     Path::new("build/out"),
///     Path::new("artifacts/out.zip"),
///     &PackConfig::default(),
///     &mut NoopProgress,
/// )?;
/// println!("{} entries", report.entries_written());
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn pack(
    source: &Path,
    output: &Path,
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackReport> {
    let format = match config.format {
        Some(format) => format,
        None => ArchiveFormat::detect(output)?,
    };
    let config = config.clone().with_format(Some(format));
    config.validate()?;

    let output = absolutize(output)?;
    let sources = collect_excluding(&absolutize(source)?, &output)?;

    if config.mode == PackMode::Append && output.exists() {
        tracing::info!("appending to {}", output.display());
        let file = OpenOptions::new().read(true).write(true).open(&output)?;
        return creation::zip::append_zip(file, sources, &config, progress);
    }

    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;
    let mut temp = NamedTempFile::new_in(parent)?;

    let report = {
        let mut writer = BufWriter::new(temp.as_file_mut());
        let report = match format {
            ArchiveFormat::Zip => creation::zip::create_zip(&mut writer, sources, &config, progress)?,
            ArchiveFormat::TarGz => {
                creation::tar::create_tar_gz(&mut writer, sources, &config, progress)?
            }
            ArchiveFormat::TarLzma => {
                creation::tar::create_tar_lzma(&mut writer, sources, &config, progress)?
            }
        };
        writer.flush()?;
        report
    };

    temp.persist(&output).map_err(|e| PipelineError::Io(e.error))?;
    tracing::info!("wrote {}", output.display());
    Ok(report)
}

/// Unpacks the container at `archive` into `dest`.
///
/// The format comes from `config.format` or the archive file name.
/// Cancellation is checked before each entry; a cancelled run returns the
/// partial report with `cancelled` set.
///
/// # Errors
///
/// Returns an error if:
/// - `archive` does not exist or its format cannot be determined
/// - the container is malformed
/// - an entry name would escape `dest`
/// - a filter or root prefix was given, no entry matched it and the run
///   was not cancelled (`PipelineError::NotFoundInContainer`)
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::CancellationToken;
/// use pipekit_core::NoopProgress;
/// use pipekit_core::config::UnpackConfig;
/// use pipekit_core::types::RootPrefix;
/// use pipekit_core::unpack;
/// use std::path::Path;
///
/// let config = UnpackConfig::default().with_root_prefix(RootPrefix::new("jdk-21"));
/// let report = unpack(
///     Path::new("jdk.tar.gz"),
///     Path::new("tools/jdk"),
///     &config,
///     &CancellationToken::new(),
///     &mut NoopProgress,
/// )?;
/// println!("{} files", report.files_extracted);
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn unpack(
    archive: &Path,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let format = match config.format {
        Some(format) => format,
        None => ArchiveFormat::detect(archive)?,
    };

    let file = File::open(archive).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::SourceNotFound {
            path: archive.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })?;
    let reader = BufReader::new(file);

    let report = match format {
        ArchiveFormat::Zip => extraction::zip::extract_zip(reader, dest, config, cancel, progress)?,
        ArchiveFormat::TarGz => {
            extraction::tar::extract_tar_gz(reader, dest, config, cancel, progress)?
        }
        ArchiveFormat::TarLzma => {
            extraction::tar::extract_tar_lzma(reader, dest, config, cancel, progress)?
        }
    };

    let selective = config.filter.is_some() || config.root_prefix.is_some();
    if selective && !report.cancelled && report.matched() == 0 {
        return Err(PipelineError::NotFoundInContainer {
            archive: archive.to_path_buf(),
            filter: config.filter.as_ref().map(|f| f.as_str().to_string()),
        });
    }
    Ok(report)
}

/// Walks `source`, leaving out the output container itself when it lives
/// inside the source tree.
fn collect_excluding(source: &Path, output: &Path) -> Result<Vec<SourceEntry>> {
    let mut sources = collect_sources(source)?;
    sources.retain(|entry| entry.path != output);
    Ok(sources)
}
