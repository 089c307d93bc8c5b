//! Archive format detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::PipelineError;
use crate::Result;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP archive (Deflate or Store).
    Zip,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Tar archive compressed with raw LZMA (13-byte "alone" header).
    TarLzma,
}

impl ArchiveFormat {
    /// Detects the format from a file name.
    ///
    /// `.tar.xz` and `.txz` map to [`ArchiveFormat::TarLzma`]: pipelines that
    /// produce these names write the raw LZMA framing, not real `.xz`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::UnsupportedFormat` for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipekit_core::formats::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ArchiveFormat::detect(Path::new("out.zip"))?, ArchiveFormat::Zip);
    /// assert_eq!(ArchiveFormat::detect(Path::new("out.TGZ"))?, ArchiveFormat::TarGz);
    /// assert_eq!(ArchiveFormat::detect(Path::new("sdk.tar.xz"))?, ArchiveFormat::TarLzma);
    /// # Ok::<(), pipekit_core::PipelineError>(())
    /// ```
    pub fn detect(path: &Path) -> Result<Self> {
        let unsupported = || PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(unsupported)?
            .to_ascii_lowercase();

        if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if [".tar.xz", ".txz", ".tar.lzma", ".tlz"]
            .iter()
            .any(|ext| name.ends_with(ext))
        {
            Ok(Self::TarLzma)
        } else {
            Err(unsupported())
        }
    }

    /// Returns `true` if existing containers of this format can be appended
    /// to.
    #[must_use]
    pub const fn supports_append(self) -> bool {
        matches!(self, Self::Zip)
    }

    /// Returns the short name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tgz",
            Self::TarLzma => "txz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tgz" | "tar.gz" => Ok(Self::TarGz),
            "txz" | "tar.xz" | "lzma" | "tar.lzma" => Ok(Self::TarLzma),
            other => Err(PipelineError::InvalidConfiguration {
                reason: format!("unknown archive format '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_zip() {
        assert_eq!(
            ArchiveFormat::detect(Path::new("a/b/out.zip")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("OUT.ZIP")).unwrap(),
            ArchiveFormat::Zip
        );
    }

    #[test]
    fn test_detect_tar_gz() {
        for name in ["a.tar.gz", "a.tgz", "A.TAR.GZ"] {
            assert_eq!(
                ArchiveFormat::detect(Path::new(name)).unwrap(),
                ArchiveFormat::TarGz
            );
        }
    }

    #[test]
    fn test_detect_tar_lzma() {
        for name in ["a.tar.xz", "a.txz", "a.tar.lzma", "a.tlz"] {
            assert_eq!(
                ArchiveFormat::detect(Path::new(name)).unwrap(),
                ArchiveFormat::TarLzma
            );
        }
    }

    #[test]
    fn test_detect_unknown() {
        let err = ArchiveFormat::detect(&PathBuf::from("a.rar")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
        assert!(ArchiveFormat::detect(Path::new("archive")).is_err());
        assert!(ArchiveFormat::detect(Path::new("a.gz")).is_err());
    }

    #[test]
    fn test_append_support() {
        assert!(ArchiveFormat::Zip.supports_append());
        assert!(!ArchiveFormat::TarGz.supports_append());
        assert!(!ArchiveFormat::TarLzma.supports_append());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ZIP".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
        assert_eq!("tgz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        assert_eq!("txz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarLzma);
        assert!("7z".parse::<ArchiveFormat>().is_err());
    }
}
