//! Root-folder unwrapping for extraction.

/// A literal entry-name prefix removed before filtering and extraction.
///
/// The prefix is stored with forward slashes, without a leading slash and
/// with exactly one trailing slash, so `"pkg"`, `"/pkg/"` and `"pkg\\"` are
/// all the same prefix. Comparison is case-sensitive.
///
/// # Examples
///
/// ```
/// use pipekit_core::types::RootPrefix;
///
/// let prefix = RootPrefix::new("pkg").unwrap();
/// assert_eq!(prefix.apply("pkg/bin/tool"), Some("bin/tool"));
/// assert_eq!(prefix.apply("pkg/"), None);
/// assert_eq!(prefix.apply("README"), Some("README"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPrefix {
    prefix: String,
}

impl RootPrefix {
    /// Normalizes `prefix`; returns `None` if nothing is left to strip.
    #[must_use]
    pub fn new(prefix: &str) -> Option<Self> {
        let normalized = prefix.trim().replace('\\', "/");
        let trimmed = normalized.trim_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            prefix: format!("{trimmed}/"),
        })
    }

    /// Returns the normalized prefix, trailing slash included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Maps an entry name through the prefix.
    ///
    /// Returns `None` for the root marker itself (the prefix, with or
    /// without its trailing slash). Names under the prefix come back with
    /// it removed; names outside it come back unchanged.
    #[must_use]
    pub fn apply<'a>(&self, name: &'a str) -> Option<&'a str> {
        if name == self.prefix || name == &self.prefix[..self.prefix.len() - 1] {
            return None;
        }
        Some(name.strip_prefix(self.prefix.as_str()).unwrap_or(name))
    }
}
