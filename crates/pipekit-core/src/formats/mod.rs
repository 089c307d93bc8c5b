//! Container formats: detection and the raw LZMA framing.

pub mod detect;
pub mod lzma;

pub use detect::ArchiveFormat;
