//! Regular-expression filter over normalized entry names.

use regex::Regex;

use crate::PipelineError;
use crate::Result;

/// A compiled entry-name filter.
///
/// The expression is matched, unanchored, against the forward-slash entry
/// name as it will be stored (when packing) or written to disk (when
/// unpacking). Anchor with `^`/`$` to match whole names.
///
/// # Examples
///
/// ```
/// use pipekit_core::types::EntryFilter;
///
/// let filter = EntryFilter::new(r"^lib/.*\.so$")?;
/// assert!(filter.is_match("lib/libfoo.so"));
/// assert!(!filter.is_match("bin/lib/libfoo.so"));
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EntryFilter {
    regex: Regex,
}

impl EntryFilter {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidFilter` if the pattern is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| PipelineError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Compiles an optional command-line filter.
    ///
    /// `None` and blank strings mean "no filter".
    pub fn optional(pattern: Option<&str>) -> Result<Option<Self>> {
        match pattern.map(str::trim) {
            None | Some("") => Ok(None),
            Some(pattern) => Self::new(pattern).map(Some),
        }
    }

    /// Returns `true` if `name` matches the expression anywhere.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
