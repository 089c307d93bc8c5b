//! Container writing.
//!
//! Packing is split in two steps. [`plan`] turns the source tree into the
//! ordered list of entries to write, applying the subfolder prefix, the
//! filter and name deduplication; the format modules then only stream
//! those entries into their container.

pub mod report;
pub mod tar;
pub mod walker;
pub mod zip;

use std::collections::HashSet;
use std::path::PathBuf;

pub use report::PackReport;
pub use walker::SourceEntry;
pub use walker::SourceKind;

use crate::config::PackConfig;

/// An entry that survived planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Source path on disk.
    pub path: PathBuf,
    /// Final entry name, subfolder included; directories end with `/`.
    pub name: String,
    /// File size in bytes, 0 for directories.
    pub size: u64,
}

impl PlannedEntry {
    /// Returns `true` for an empty-directory placeholder.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Decides which source entries get written and under which names.
///
/// `existing` holds names already present in the container (append mode).
/// The filter sees the prefixed name without a trailing slash and runs
/// before deduplication, so a filtered entry is never reported as a
/// duplicate. Skips are counted in `report`.
pub fn plan(
    sources: Vec<SourceEntry>,
    config: &PackConfig,
    existing: HashSet<String>,
    report: &mut PackReport,
) -> Vec<PlannedEntry> {
    let prefix = config.subfolder_prefix();
    let mut seen = existing;
    let mut planned = Vec::with_capacity(sources.len());

    for source in sources {
        if source.kind == SourceKind::Symlink {
            tracing::warn!(path = %source.path.display(), "skipping symlink");
            report.add_warning(format!("skipped symlink: {}", source.path.display()));
            continue;
        }

        let name = format!("{prefix}{}", source.name);
        if let Some(filter) = &config.filter
            && !filter.is_match(&name)
        {
            tracing::debug!("skipping {name}: does not match {}", filter.as_str());
            report.skipped_filtered += 1;
            continue;
        }

        let name = match source.kind {
            SourceKind::EmptyDirectory => format!("{name}/"),
            _ => name,
        };
        if !seen.insert(name.clone()) {
            tracing::info!("skipping {name}: already exists in archive");
            report.skipped_existing += 1;
            continue;
        }

        planned.push(PlannedEntry {
            path: source.path,
            name,
            size: source.size,
        });
    }

    planned
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::EntryFilter;

    fn source(name: &str, kind: SourceKind) -> SourceEntry {
        SourceEntry {
            path: PathBuf::from("/src").join(name),
            name: name.to_string(),
            kind,
            size: 1,
        }
    }

    fn names(planned: &[PlannedEntry]) -> Vec<&str> {
        planned.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_plan_applies_subfolder_and_dir_suffix() {
        let config = PackConfig::default().with_subfolder(Some("pkg".to_string()));
        let mut report = PackReport::new();
        let planned = plan(
            vec![
                source("a/b.txt", SourceKind::File),
                source("a/empty", SourceKind::EmptyDirectory),
            ],
            &config,
            HashSet::new(),
            &mut report,
        );
        assert_eq!(names(&planned), vec!["pkg/a/b.txt", "pkg/a/empty/"]);
        assert!(planned[1].is_directory());
    }

    #[test]
    fn test_plan_skips_existing_names() {
        let config = PackConfig::default();
        let mut report = PackReport::new();
        let existing = HashSet::from(["a.txt".to_string(), "d/".to_string()]);
        let planned = plan(
            vec![
                source("a.txt", SourceKind::File),
                source("b.txt", SourceKind::File),
                source("d", SourceKind::EmptyDirectory),
            ],
            &config,
            existing,
            &mut report,
        );
        assert_eq!(names(&planned), vec!["b.txt"]);
        assert_eq!(report.skipped_existing, 2);
    }

    #[test]
    fn test_plan_filter_runs_before_dedup() {
        let config =
            PackConfig::default().with_filter(Some(EntryFilter::new(r"^lib/.*\.so$").unwrap()));
        let mut report = PackReport::new();
        let existing = HashSet::from(["bin/tool".to_string()]);
        let planned = plan(
            vec![
                source("bin/tool", SourceKind::File),
                source("lib/a.so", SourceKind::File),
                source("lib/a.so.txt", SourceKind::File),
            ],
            &config,
            existing,
            &mut report,
        );
        assert_eq!(names(&planned), vec!["lib/a.so"]);
        assert_eq!(report.skipped_filtered, 2);
        assert_eq!(report.skipped_existing, 0);
    }

    #[test]
    fn test_plan_warns_on_symlinks() {
        let mut report = PackReport::new();
        let planned = plan(
            vec![source("link", SourceKind::Symlink)],
            &PackConfig::default(),
            HashSet::new(),
            &mut report,
        );
        assert!(planned.is_empty());
        assert!(report.has_warnings());
    }
}
