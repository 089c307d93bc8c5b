//! Archive entry-name normalization.
//!
//! Entry names are what both the writer stores and the filter regex sees:
//! relative to the source root, forward-slash separated, with no leading or
//! trailing separator.

use std::path::Path;

use crate::PipelineError;
use crate::Result;

/// Computes the archive entry name of `full_path` relative to `base_path`.
///
/// `full_path` must start with `base_path` at a separator boundary. The
/// comparison ignores ASCII case on platforms whose default filesystems are
/// case-insensitive (Windows, macOS). Separators at the boundary and at the
/// end are stripped, the remaining ones are converted to `/`. The result is
/// empty only when both paths name the same location.
///
/// # Errors
///
/// Returns `PipelineError::InvalidRelation` if `full_path` is not located
/// under `base_path`, or if either path is not valid UTF-8.
///
/// # Examples
///
/// ```
/// # #[cfg(unix)]
/// # {
/// use pipekit_core::paths::entry_name;
/// use std::path::Path;
///
/// let name = entry_name(Path::new("/src/app/lib/a.so"), Path::new("/src/app"))?;
/// assert_eq!(name, "lib/a.so");
///
/// let root = entry_name(Path::new("/src/app/"), Path::new("/src/app"))?;
/// assert_eq!(root, "");
///
/// assert!(entry_name(Path::new("/elsewhere/a.so"), Path::new("/src/app")).is_err());
/// # }
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn entry_name(full_path: &Path, base_path: &Path) -> Result<String> {
    let relation_error = || PipelineError::InvalidRelation {
        path: full_path.to_path_buf(),
        base: base_path.to_path_buf(),
    };

    let full = full_path.to_str().ok_or_else(relation_error)?;
    let base = base_path.to_str().ok_or_else(relation_error)?;

    let head = full.get(..base.len()).ok_or_else(relation_error)?;
    let same_prefix = if CASE_INSENSITIVE_FS {
        head.eq_ignore_ascii_case(base)
    } else {
        head == base
    };
    if !same_prefix {
        return Err(relation_error());
    }

    let rest = &full[base.len()..];
    let on_boundary = base.is_empty()
        || base.ends_with(std::path::is_separator)
        || rest.is_empty()
        || rest.starts_with(std::path::is_separator);
    if !on_boundary {
        // "/src/application" must not count as being under "/src/app"
        return Err(relation_error());
    }

    let trimmed = rest.trim_matches(std::path::is_separator);
    Ok(trimmed
        .split(std::path::is_separator)
        .collect::<Vec<_>>()
        .join("/"))
}

pub(crate) const CASE_INSENSITIVE_FS: bool = cfg!(any(windows, target_os = "macos"));
