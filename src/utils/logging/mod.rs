//! Logging utilities
//!
//! Standardized log lines for dataset operations plus progress reporting for
//! long per-record loops.

pub mod progress;

pub use progress::create_progress_bar;

use std::path::Path;
use std::time::Duration;

/// Log the completion of a dataset read with consistent format
pub fn log_read_complete(path: &Path, rows: usize, elapsed: Duration) {
    log::info!("Read {} rows from {} in {:?}", rows, path.display(), elapsed);
}

/// Log the completion of a dataset write with consistent format
pub fn log_write_complete(path: &Path, rows: usize) {
    log::info!("Wrote {} rows to {}", rows, path.display());
}
