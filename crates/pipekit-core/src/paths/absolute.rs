//! Lexical path absolutization.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;

/// Converts `path` to an absolute path and collapses `.` and `..` segments.
///
/// The conversion is purely lexical: the filesystem is not consulted and
/// symlinks are not resolved, so the result is stable even for paths that
/// do not exist yet. A `..` at the root stays at the root.
///
/// # Errors
///
/// Returns an error if `path` is relative and the current directory cannot
/// be determined.
///
/// # Examples
///
/// ```
/// # #[cfg(unix)]
/// # {
/// use pipekit_core::paths::absolutize;
/// use std::path::Path;
///
/// let abs = absolutize("/work/build/../src/./main.rs")?;
/// assert_eq!(abs, Path::new("/work/src/main.rs"));
/// # }
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn absolutize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() refuses to remove the root, which is what we want
                if normalized.file_name().is_some() {
                    normalized.pop();
                }
            }
        }
    }

    Ok(normalized)
}
