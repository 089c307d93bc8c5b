//! Filesystem path handling: absolutization, wildcard expansion and
//! archive entry-name normalization.

pub mod absolute;
pub mod entry_name;
pub mod glob;

pub use absolute::absolutize;
pub use entry_name::entry_name;
pub use glob::PathGlob;
pub use glob::ResolvedPaths;
pub use glob::resolve_paths;
pub use glob::resolve_single;
