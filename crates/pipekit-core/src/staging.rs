//! Temporary staging for fetch-then-extract flows.
//!
//! A fetcher drops the container into a staged file, the reader unpacks it,
//! and the staged file is removed whatever the outcome.

use std::path::Path;
use std::path::PathBuf;

use crate::CancellationToken;
use crate::ExtractionReport;
use crate::PipelineError;
use crate::ProgressCallback;
use crate::Result;
use crate::api::unpack;
use crate::config::UnpackConfig;
use crate::formats::ArchiveFormat;

/// Resolution of the user-supplied temp location.
#[derive(Debug, Clone, Copy)]
pub struct TempTarget;

impl TempTarget {
    /// Resolves where a fetched file should be staged.
    ///
    /// - no override: a fresh file name in the system temp directory
    /// - an existing file: that file, deleted so the fetch starts clean
    /// - an existing directory, or a path ending in a separator (created if
    ///   needed): a random file name inside it
    /// - anything else: the path itself, with its parent directory created
    ///
    /// The returned path never exists when this returns.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be created or a stale file
    /// cannot be removed.
    pub fn resolve(temp_override: Option<&Path>) -> Result<PathBuf> {
        let Some(requested) = temp_override.filter(|p| !p.as_os_str().is_empty()) else {
            return random_name_in(&std::env::temp_dir());
        };

        let path = if requested.is_file() {
            requested.to_path_buf()
        } else if requested.is_dir() {
            random_name_in(requested)?
        } else if ends_with_separator(requested) {
            std::fs::create_dir_all(requested)?;
            random_name_in(requested)?
        } else {
            let absolute = crate::paths::absolutize(requested)?;
            if let Some(parent) = absolute.parent() {
                std::fs::create_dir_all(parent)?;
            }
            absolute
        };

        if path.is_file() {
            std::fs::remove_file(&path)?;
        }
        Ok(path)
    }
}

fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator)
}

fn random_name_in(dir: &Path) -> Result<PathBuf> {
    // only borrows tempfile's name generator; nothing is created on disk
    let named = tempfile::Builder::new()
        .prefix("pipekit-")
        .make_in(dir, |path| Ok(path.to_path_buf()))?;
    Ok(named.path().to_path_buf())
}

/// Owns a staged file path and removes the file on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Resolves a staging location, see [`TempTarget::resolve`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TempTarget::resolve`].
    pub fn new(temp_override: Option<&Path>) -> Result<Self> {
        Ok(Self {
            path: TempTarget::resolve(temp_override)?,
        })
    }

    /// Returns the staged path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("could not remove staged file {}: {e}", self.path.display());
        }
    }
}

/// Brings a remote or local resource into a local file.
///
/// Network transports implement this outside the core; [`LocalFetcher`]
/// covers paths and `file://` URLs.
pub trait Fetcher {
    /// Copies `source` to `target`, which does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read or written.
    fn fetch(&self, source: &str, target: &Path) -> Result<()>;
}

/// Fetches from the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::staging::Fetcher;
/// use pipekit_core::staging::LocalFetcher;
/// use std::path::Path;
///
/// LocalFetcher.fetch("file:///mnt/cache/sdk.zip", Path::new("/tmp/sdk.zip"))?;
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    fn local_path(source: &str) -> PathBuf {
        let stripped = source.strip_prefix("file://").unwrap_or(source);
        // file:///C:/x keeps a leading slash before the drive letter
        let bytes = stripped.as_bytes();
        if bytes.len() > 3 && bytes[0] == b'/' && bytes[2] == b':' && cfg!(windows) {
            PathBuf::from(&stripped[1..])
        } else {
            PathBuf::from(stripped)
        }
    }
}

impl Fetcher for LocalFetcher {
    fn fetch(&self, source: &str, target: &Path) -> Result<()> {
        let path = Self::local_path(source);
        if !path.is_file() {
            return Err(PipelineError::SourceNotFound { path });
        }
        std::fs::copy(&path, target)?;
        Ok(())
    }
}

/// Fetches `source` into a staged file, unpacks it into `dest` and removes
/// the staged file.
///
/// Unless `config.format` is set, the format is detected from the source
/// name, since the staged file name carries no extension.
///
/// # Errors
///
/// Returns fetch errors, format detection errors and everything
/// [`unpack`] can return.
pub fn stage_and_extract(
    fetcher: &dyn Fetcher,
    source: &str,
    temp_override: Option<&Path>,
    dest: &Path,
    config: &UnpackConfig,
    cancel: &CancellationToken,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let format = match config.format {
        Some(format) => format,
        None => ArchiveFormat::detect(Path::new(source_file_name(source)))?,
    };
    let config = config.clone().with_format(Some(format));

    let staged = StagedFile::new(temp_override)?;
    tracing::info!("fetching {source} to {}", staged.path().display());
    fetcher.fetch(source, staged.path())?;

    unpack(staged.path(), dest, &config, cancel, progress)
}

/// Last path segment of a path or URL, without query or fragment.
fn source_file_name(source: &str) -> &str {
    let end = source.find(['?', '#']).unwrap_or(source.len());
    let trimmed = &source[..end];
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}
