//! Source tree enumeration.

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::PipelineError;
use crate::Result;
use crate::paths::entry_name;

/// What a source entry turns into inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Regular file, written with its content.
    File,
    /// Directory with nothing inside, written as a `name/` placeholder.
    EmptyDirectory,
    /// Symbolic link, never written.
    Symlink,
}

/// One candidate entry found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Full filesystem path.
    pub path: PathBuf,
    /// Entry name relative to the source root, forward-slash separated,
    /// without subfolder prefix or trailing slash.
    pub name: String,
    /// Entry kind.
    pub kind: SourceKind,
    /// File size in bytes (0 for everything else).
    pub size: u64,
}

/// Enumerates the candidate entries of a pack source.
///
/// A directory source yields every file, symlink and empty directory below
/// it in file-name order; directories that contain anything are implied by
/// their children and not yielded. A file source yields itself, named by its
/// file name.
///
/// # Errors
///
/// Returns `PipelineError::SourceNotFound` if `source` does not exist, and
/// an I/O error if part of the tree cannot be read.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::creation::walker::collect_sources;
/// use std::path::Path;
///
/// for entry in collect_sources(Path::new("dist"))? {
///     println!("{} ({:?})", entry.name, entry.kind);
/// }
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn collect_sources(source: &Path) -> Result<Vec<SourceEntry>> {
    let metadata = match std::fs::symlink_metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::SourceNotFound {
                path: source.to_path_buf(),
            })?;
        let kind = if metadata.is_symlink() {
            SourceKind::Symlink
        } else {
            SourceKind::File
        };
        return Ok(vec![SourceEntry {
            path: source.to_path_buf(),
            name,
            kind,
            size: metadata.len(),
        }]);
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            PipelineError::Io(std::io::Error::other(format!("walkdir error: {e}")))
        })?;
        let file_type = entry.file_type();

        let (kind, size) = if file_type.is_symlink() {
            (SourceKind::Symlink, 0)
        } else if file_type.is_dir() {
            if std::fs::read_dir(entry.path())?.next().is_some() {
                continue;
            }
            (SourceKind::EmptyDirectory, 0)
        } else {
            let metadata = entry.metadata().map_err(|e| {
                PipelineError::Io(std::io::Error::other(format!(
                    "cannot read metadata for {}: {e}",
                    entry.path().display()
                )))
            })?;
            (SourceKind::File, metadata.len())
        };

        entries.push(SourceEntry {
            name: entry_name(entry.path(), source)?,
            path: entry.into_path(),
            kind,
            size,
        });
    }

    Ok(entries)
}
