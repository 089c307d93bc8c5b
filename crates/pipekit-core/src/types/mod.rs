//! Value types shared by the archive writer and reader.
//!
//! Both types normalize their input once, on construction, so the hot loops
//! over archive entries only do cheap string comparisons.

pub mod entry_filter;
pub mod root_prefix;

pub use entry_filter::EntryFilter;
pub use root_prefix::RootPrefix;
