use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::stats::StatsCollector;

/// Progress spinner for scan runs.
///
/// The total entry count is unknown until the walk finishes, so this is a
/// spinner with a running counter rather than a bar. Automatically disabled
/// in quiet mode or when stderr is not a TTY.
pub struct ScanProgress {
    spinner: ProgressBar,
}

impl ScanProgress {
    /// Creates a new progress spinner.
    ///
    /// The spinner outputs to stderr to avoid interfering with stdout output.
    ///
    /// # Panics
    ///
    /// This function will panic if the spinner template is invalid.
    /// The template is a compile-time constant, so this should never happen.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(quiet, is_tty)
    }

    /// Creates a spinner with explicit visibility control.
    ///
    /// This is an internal constructor that allows testing the visible
    /// spinner path even when running in non-TTY environments.
    fn new_with_visibility(quiet: bool, is_tty: bool) -> Self {
        let spinner = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            Self::create_visible_spinner()
        };

        Self { spinner }
    }

    fn create_visible_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} Scanning: {pos} entries {msg}")
                // SAFETY: Template is a static string with valid format specifiers
                .expect("valid template"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Finishes the spinner and clears it from the terminal.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl StatsCollector for ScanProgress {
    fn after_inode_visited(&self, _path: &Path) {
        self.spinner.inc(1);
    }

    fn after_extract(&self, extractor: &str, _path: &Path, _elapsed: Duration, _ok: bool) {
        self.spinner.set_message(format!("(last: {extractor})"));
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
