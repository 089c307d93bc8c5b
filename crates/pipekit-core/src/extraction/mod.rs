//! Container reading.

pub mod common;
pub mod tar;
pub mod zip;

pub use common::EntryKind;
pub use common::EntrySink;
