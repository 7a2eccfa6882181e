use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Console spinner that repaints one status line while a slow step runs.
///
/// The tick runs on indicatif's background timer; the line is cleared exactly
/// once, either by `finish` on the success path or by `Drop` when an error or
/// cancellation unwinds past the spinner.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start spinning with the given status message.
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧ ")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop the spinner and clear its line.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Byte-level progress bar for model downloads.
///
/// Falls back to a running byte counter when the server does not report a
/// content length.
pub fn download_bar(total_bytes: Option<u64>) -> ProgressBar {
    match total_bytes {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {bytes} downloaded...")
                    .unwrap(),
            );
            bar
        }
    }
}
