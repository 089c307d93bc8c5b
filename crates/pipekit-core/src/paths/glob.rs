//! Wildcard path expansion.
//!
//! A pattern is an absolute (or absolutized) path whose segments may contain
//! `*` (any run of characters within one segment), `?` (exactly one
//! character) or be exactly `**` (zero or more directory levels).
//!
//! Expansion keeps a *frontier*: the set of existing paths reached after
//! consuming the first segments of the pattern. Each segment maps the
//! frontier to the next one; whatever is left at the end, plus any files
//! matched by a trailing wildcard segment, is the result.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use glob::MatchOptions;
use glob::Pattern;
use walkdir::WalkDir;

use super::absolute::absolutize;
use crate::PipelineError;
use crate::Result;

/// A compiled path pattern.
///
/// Compilation absolutizes the pattern (collapsing `.` and `..`) and splits
/// it into segments; no filesystem access happens until the pattern is
/// iterated. Every call to [`PathGlob::iter`] re-reads the filesystem.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::paths::PathGlob;
///
/// let glob = PathGlob::new("/build/out/**/*.so")?;
/// for path in glob.iter() {
///     println!("{}", path?.display());
/// }
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PathGlob {
    pattern: String,
    absolute: PathBuf,
    root: PathBuf,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(OsString),
    Wildcard(Pattern),
    Recursive,
}

impl PathGlob {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidPattern` if a wildcard segment is not
    /// valid UTF-8 or cannot be compiled, and an I/O error if a relative
    /// pattern is given and the current directory is unavailable.
    pub fn new<P: AsRef<Path>>(pattern: P) -> Result<Self> {
        let pattern = pattern.as_ref();
        let display = pattern.to_string_lossy().into_owned();
        let absolute = absolutize(pattern)?;

        let mut root = PathBuf::new();
        let mut segments = Vec::new();
        for component in absolute.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => root.push(component),
                Component::Normal(name) => segments.push(compile_segment(name, &display)?),
                // absolutize() leaves neither `.` nor `..` behind
                Component::CurDir | Component::ParentDir => {}
            }
        }

        Ok(Self {
            pattern: display,
            absolute,
            root,
            segments,
        })
    }

    /// Returns the pattern as originally given.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the absolutized pattern.
    #[must_use]
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Returns `true` if the pattern contains no wildcard segment.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Returns a lazy iterator over the matching paths.
    ///
    /// A literal pattern yields exactly its absolute form, whether or not it
    /// exists. Otherwise the directories leading up to the last segment are
    /// expanded on the first call to `next()`; files matched by a trailing
    /// wildcard segment are then yielded folder by folder as each one is
    /// listed, followed by the matched directories.
    #[must_use]
    pub fn iter(&self) -> ResolvedPaths<'_> {
        ResolvedPaths {
            glob: self,
            state: State::Start,
        }
    }

    fn start(&self) -> Result<State<'_>> {
        if self.is_literal() {
            return Ok(State::Draining(BTreeSet::from([self.absolute.clone()]).into_iter()));
        }
        let Some((last, leading)) = self.segments.split_last() else {
            return Ok(State::Done);
        };

        let mut frontier = BTreeSet::from([self.root.clone()]);
        for segment in leading {
            frontier = advance(segment, &frontier)?;
        }

        Ok(match last {
            Segment::Wildcard(pattern) => State::Listing {
                pattern,
                folders: frontier.into_iter(),
                entries: Vec::new().into_iter(),
                dirs: BTreeSet::new(),
            },
            other => State::Draining(advance(other, &frontier)?.into_iter()),
        })
    }
}

/// Maps a frontier through one non-final segment: wildcard matches keep
/// only directories.
fn advance(segment: &Segment, frontier: &BTreeSet<PathBuf>) -> Result<BTreeSet<PathBuf>> {
    let mut next = BTreeSet::new();
    match segment {
        Segment::Recursive => {
            for folder in frontier {
                next.insert(folder.clone());
                collect_descendant_dirs(folder, &mut next)?;
            }
        }
        Segment::Wildcard(pattern) => {
            for folder in frontier {
                for (name, path) in list_dir(folder)? {
                    if pattern.matches_with(&name, match_options()) && path.is_dir() {
                        next.insert(path);
                    }
                }
            }
        }
        Segment::Literal(name) => {
            for folder in frontier {
                let candidate = folder.join(name);
                if candidate.exists() {
                    next.insert(candidate);
                }
            }
        }
    }
    Ok(next)
}

/// Lazy iterator returned by [`PathGlob::iter`].
#[derive(Debug)]
pub struct ResolvedPaths<'a> {
    glob: &'a PathGlob,
    state: State<'a>,
}

#[derive(Debug)]
enum State<'a> {
    Start,
    /// Listing the frontier against the trailing wildcard segment.
    Listing {
        pattern: &'a Pattern,
        folders: std::collections::btree_set::IntoIter<PathBuf>,
        entries: std::vec::IntoIter<(String, PathBuf)>,
        dirs: BTreeSet<PathBuf>,
    },
    Draining(std::collections::btree_set::IntoIter<PathBuf>),
    Done,
}

impl Iterator for ResolvedPaths<'_> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Start => match self.glob.start() {
                    Ok(state) => self.state = state,
                    Err(e) => {
                        self.state = State::Done;
                        return Some(Err(e));
                    }
                },
                State::Listing {
                    pattern,
                    folders,
                    entries,
                    dirs,
                } => {
                    if let Some((name, path)) = entries.next() {
                        if !pattern.matches_with(&name, match_options()) {
                            continue;
                        }
                        if path.is_dir() {
                            dirs.insert(path);
                            continue;
                        }
                        return Some(Ok(path));
                    }
                    match folders.next() {
                        Some(folder) => match list_dir(&folder) {
                            Ok(listed) => *entries = listed.into_iter(),
                            Err(e) => {
                                self.state = State::Done;
                                return Some(Err(e));
                            }
                        },
                        None => {
                            let dirs = std::mem::take(dirs);
                            self.state = State::Draining(dirs.into_iter());
                        }
                    }
                }
                State::Draining(paths) => {
                    let next = paths.next();
                    if next.is_none() {
                        self.state = State::Done;
                    }
                    return next.map(Ok);
                }
                State::Done => return None,
            }
        }
    }
}

/// Resolves `pattern` to every matching path.
///
/// Zero matches is not an error here; callers that need a match decide.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a directory on the way
/// cannot be read.
///
/// # Examples
///
/// ```no_run
/// use pipekit_core::paths::resolve_paths;
///
/// let logs = resolve_paths("/var/log/**/*.log")?;
/// println!("{} log files", logs.len());
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
pub fn resolve_paths<P: AsRef<Path>>(pattern: P) -> Result<Vec<PathBuf>> {
    PathGlob::new(pattern)?.iter().collect()
}

/// Resolves `pattern` to exactly one path.
///
/// # Errors
///
/// Returns `PipelineError::PatternMismatch` if the pattern matches no path
/// or more than one distinct path.
pub fn resolve_single<P: AsRef<Path>>(pattern: P) -> Result<PathBuf> {
    let glob = PathGlob::new(pattern)?;
    let mut matches = Vec::new();
    for path in glob.iter() {
        let path = path?;
        if !matches.contains(&path) {
            matches.push(path);
        }
    }

    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(PipelineError::PatternMismatch {
            pattern: glob.pattern,
            matches,
        })
    }
}

fn compile_segment(name: &std::ffi::OsStr, pattern: &str) -> Result<Segment> {
    let Some(text) = name.to_str() else {
        if name.as_encoded_bytes().iter().any(|b| *b == b'*' || *b == b'?') {
            return Err(PipelineError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "wildcard segment is not valid UTF-8".to_string(),
            });
        }
        return Ok(Segment::Literal(name.to_os_string()));
    };

    if text == "**" {
        return Ok(Segment::Recursive);
    }
    if !text.contains(['*', '?']) {
        return Ok(Segment::Literal(name.to_os_string()));
    }

    // Only `*` and `?` are wildcards here: brackets are matched literally and
    // runs of stars inside a segment behave like a single star.
    let mut source = String::with_capacity(text.len() + 4);
    let mut previous_star = false;
    for c in text.chars() {
        match c {
            '*' if previous_star => continue,
            '[' => source.push_str("[[]"),
            ']' => source.push_str("[]]"),
            _ => source.push(c),
        }
        previous_star = c == '*';
    }

    Pattern::new(&source)
        .map(Segment::Wildcard)
        .map_err(|e| PipelineError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !super::entry_name::CASE_INSENSITIVE_FS,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Lists a frontier directory, sorted by name.
///
/// Members that vanished or turned out to be files contribute nothing.
fn list_dir(folder: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut listed = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        listed.push((name, entry.path()));
    }
    listed.sort();
    Ok(listed)
}

fn collect_descendant_dirs(folder: &Path, into: &mut BTreeSet<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(folder).min_depth(1) {
        let entry = entry
            .map_err(|e| PipelineError::Io(io::Error::other(format!("walkdir error: {e}"))))?;
        if entry.file_type().is_dir() {
            into.insert(entry.into_path());
        }
    }
    Ok(())
}
