//! Run reporting: console output, progress sinks and summary documents.

pub mod console;
pub mod progress;
pub mod summary;
