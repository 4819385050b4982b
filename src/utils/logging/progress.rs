//! Progress reporting for long-running per-record loops, using the indicatif
//! crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Style for stage progress bars
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a progress bar with the standardized style
///
/// Hidden automatically when stderr is not a terminal, so library callers and
/// tests stay quiet.
#[must_use]
pub fn create_progress_bar(length: u64, description: &str) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(description.to_string());
    pb
}
