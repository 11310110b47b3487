//! The scan engine: per-file matching, the worker pool, and the
//! orchestration that ties rule loading, enumeration, and dispatch
//! together.

pub mod engine;
pub mod matcher;
pub mod pool;

pub use engine::{scan, scan_with_signal};
pub use matcher::FileMatcher;
