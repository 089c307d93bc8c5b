//! Build-pipeline file operations: glob resolution and archive packing.
//!
//! `pipekit-core` resolves path globs against the filesystem, packs
//! directories into zip, tar.gz and tar.lzma containers (creating or
//! appending), and unpacks them again with entry filtering, root-prefix
//! stripping and path-traversal protection.
//!
//! # Examples
//!
//! ```no_run
//! use pipekit_core::CancellationToken;
//! use pipekit_core::NoopProgress;
//! use pipekit_core::config::PackConfig;
//! use pipekit_core::config::UnpackConfig;
//! use pipekit_core::pack;
//! use pipekit_core::resolve_single;
//! use pipekit_core::unpack;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let build = resolve_single("target/*/release")?;
//! pack(&build, Path::new("out/app.zip"), &PackConfig::default(), &mut NoopProgress)?;
//!
//! let report = unpack(
//!     Path::new("out/app.zip"),
//!     Path::new("deploy"),
//!     &UnpackConfig::default(),
//!     &CancellationToken::new(),
//!     &mut NoopProgress,
//! )?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cancel;
pub mod config;
pub mod creation;
pub mod env_sink;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod paths;
pub mod platform;
pub mod progress;
pub mod report;
pub mod staging;
pub mod types;

// Re-export main API types
pub use api::pack;
pub use api::unpack;
pub use cancel::CancellationToken;
pub use config::CompressionLevel;
pub use config::PackConfig;
pub use config::PackMode;
pub use config::UnpackConfig;
pub use creation::PackReport;
pub use env_sink::EnvironmentSink;
pub use error::PipelineError;
pub use error::Result;
pub use formats::ArchiveFormat;
pub use paths::PathGlob;
pub use paths::resolve_paths;
pub use paths::resolve_single;
pub use platform::PlatformIdentifier;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
