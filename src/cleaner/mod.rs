//! Cleaners: orphan/cruft removal and content surgery

pub mod content_cleaner;
pub mod deep_cleaner;

pub use content_cleaner::{ContentSurgeon, ProcessingResult};
pub use deep_cleaner::{CleanResult, CleaningStatistics, SafeRemover};
