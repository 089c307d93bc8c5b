//! Configuration for pack and unpack operations.

use std::fmt;
use std::str::FromStr;

use crate::PipelineError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::types::EntryFilter;
use crate::types::RootPrefix;

/// How the writer treats an existing output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackMode {
    /// Write a new container, replacing any existing file.
    #[default]
    Create,
    /// Add entries to an existing container. Names already present are
    /// skipped, never replaced.
    Append,
}

/// Requested compression effort, mapped onto each container's own scale.
///
/// | level           | zip           | gzip | lzma preset |
/// |-----------------|---------------|------|-------------|
/// | `Optimal`       | Deflate 6     | 6    | 6           |
/// | `Fastest`       | Deflate 1     | 1    | 1           |
/// | `NoCompression` | Stored        | 0    | 0           |
/// | `SmallestSize`  | Deflate 9     | 9    | 9           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Balanced speed and size.
    #[default]
    Optimal,
    /// Fastest compression.
    Fastest,
    /// Store without compressing.
    NoCompression,
    /// Smallest output.
    SmallestSize,
}

impl CompressionLevel {
    /// Deflate level for zip entries, `None` meaning Stored.
    #[must_use]
    pub const fn zip_level(self) -> Option<i64> {
        match self {
            Self::Optimal => Some(6),
            Self::Fastest => Some(1),
            Self::NoCompression => None,
            Self::SmallestSize => Some(9),
        }
    }

    /// Gzip compression for tar.gz output.
    #[must_use]
    pub fn gzip(self) -> flate2::Compression {
        match self {
            Self::Optimal => flate2::Compression::default(),
            Self::Fastest => flate2::Compression::fast(),
            Self::NoCompression => flate2::Compression::none(),
            Self::SmallestSize => flate2::Compression::best(),
        }
    }

    /// LZMA preset for raw LZMA tar output.
    #[must_use]
    pub const fn lzma_preset(self) -> u32 {
        match self {
            Self::Optimal => 6,
            Self::Fastest => 1,
            Self::NoCompression => 0,
            Self::SmallestSize => 9,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Fastest => "fastest",
            Self::NoCompression => "no-compression",
            Self::SmallestSize => "smallest-size",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "optimal" => Ok(Self::Optimal),
            "fastest" => Ok(Self::Fastest),
            "nocompression" | "none" => Ok(Self::NoCompression),
            "smallestsize" | "smallest" => Ok(Self::SmallestSize),
            _ => Err(PipelineError::InvalidConfiguration {
                reason: format!("unknown compression level '{s}'"),
            }),
        }
    }
}

/// Configuration for packing a directory or file into a container.
///
/// # Examples
///
/// ```
/// use pipekit_core::config::CompressionLevel;
/// use pipekit_core::config::PackConfig;
/// use pipekit_core::config::PackMode;
/// use pipekit_core::types::EntryFilter;
///
/// let config = PackConfig::default()
///     .with_mode(PackMode::Append)
///     .with_subfolder(Some("tools\\bin".to_string()))
///     .with_filter(Some(EntryFilter::new(r"\.exe$")?))
///     .with_compression(CompressionLevel::SmallestSize);
/// assert_eq!(config.subfolder_prefix(), "tools/bin/");
/// config.validate()?;
/// # Ok::<(), pipekit_core::PipelineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackConfig {
    /// Create a new container or append to an existing one.
    ///
    /// Default: `Create`.
    pub mode: PackMode,

    /// Folder inside the container that receives the entries.
    ///
    /// Default: `None` (entries land at the container root).
    pub subfolder: Option<String>,

    /// Only entries whose name (subfolder included) matches are written.
    ///
    /// Default: `None`.
    pub filter: Option<EntryFilter>,

    /// Compression effort.
    ///
    /// Default: `Optimal`.
    pub compression: CompressionLevel,

    /// Container format. `None` means detect from the output file name.
    ///
    /// Default: `None`.
    pub format: Option<ArchiveFormat>,
}

impl PackConfig {
    /// Creates a new `PackConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pack mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the subfolder prefix.
    #[must_use]
    pub fn with_subfolder(mut self, subfolder: Option<String>) -> Self {
        self.subfolder = subfolder;
        self
    }

    /// Sets the entry filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<EntryFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the container format.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveFormat>) -> Self {
        self.format = format;
        self
    }

    /// Returns the subfolder as an entry-name prefix: forward slashes, no
    /// leading slash, one trailing slash, or empty.
    #[must_use]
    pub fn subfolder_prefix(&self) -> String {
        let Some(subfolder) = self.subfolder.as_deref() else {
            return String::new();
        };
        let normalized = subfolder.trim().replace('\\', "/");
        let trimmed = normalized.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the subfolder contains a `..` segment
    /// - `Append` is combined with a format that cannot be appended to
    pub fn validate(&self) -> Result<()> {
        if self.subfolder_prefix().split('/').any(|segment| segment == "..") {
            return Err(PipelineError::InvalidConfiguration {
                reason: format!(
                    "subfolder '{}' must not contain '..'",
                    self.subfolder.as_deref().unwrap_or_default()
                ),
            });
        }
        if self.mode == PackMode::Append
            && let Some(format) = self.format
            && !format.supports_append()
        {
            return Err(PipelineError::UnsupportedOperation {
                reason: format!("append is not supported for {format} containers"),
            });
        }
        Ok(())
    }
}

/// Configuration for unpacking a container into a directory.
///
/// # Examples
///
/// ```
/// use pipekit_core::config::UnpackConfig;
/// use pipekit_core::types::RootPrefix;
///
/// let config = UnpackConfig::default()
///     .with_overwrite(true)
///     .with_root_prefix(RootPrefix::new("package"));
/// assert!(config.overwrite);
/// assert_eq!(config.root_prefix.unwrap().as_str(), "package/");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnpackConfig {
    /// Only entries whose name (after root-prefix stripping) matches are
    /// extracted.
    ///
    /// Default: `None`.
    pub filter: Option<EntryFilter>,

    /// Replace files that already exist at the destination.
    ///
    /// Default: `false` (existing content wins).
    pub overwrite: bool,

    /// Leading folder removed from entry names.
    ///
    /// Default: `None`.
    pub root_prefix: Option<RootPrefix>,

    /// Container format. `None` means detect from the archive file name.
    ///
    /// Default: `None`.
    pub format: Option<ArchiveFormat>,
}

impl UnpackConfig {
    /// Creates a new `UnpackConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<EntryFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets whether existing files are replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the root prefix.
    #[must_use]
    pub fn with_root_prefix(mut self, root_prefix: Option<RootPrefix>) -> Self {
        self.root_prefix = root_prefix;
        self
    }

    /// Sets the container format.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveFormat>) -> Self {
        self.format = format;
        self
    }
}
