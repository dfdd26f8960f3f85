//! Progress reporting for CLI operations.

use crate::output::OutputFormatter;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use payload_core::ArchiveTally;
use payload_core::Entry;
use payload_core::ProgressCallback;
use std::time::Duration;

/// CLI spinner implementing `ProgressCallback`.
///
/// A payload does not announce its entry count up front, so this shows a
/// running count of entries and bytes instead of a bounded bar. Cleared on
/// drop.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
}

impl CliProgress {
    /// Creates a new spinner with the given message (e.g. "Extracting").
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {prefix} {pos} entries ({msg}, {elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_string());
        bar.set_message(humanize_bytes(0));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            bytes_written: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry(&mut self, _entry: &Entry, _link_target: Option<&str>) {
        self.bar.inc(1);
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.bar.set_message(humanize_bytes(self.bytes_written));
    }

    fn on_complete(&mut self, _tally: &ArchiveTally) {
        self.bar.finish_and_clear();
    }
}

/// Forwards every walked entry to the output formatter.
pub struct EntryPrinter<'a> {
    formatter: &'a dyn OutputFormatter,
}

impl<'a> EntryPrinter<'a> {
    pub fn new(formatter: &'a dyn OutputFormatter) -> Self {
        Self { formatter }
    }
}

impl ProgressCallback for EntryPrinter<'_> {
    fn on_entry(&mut self, entry: &Entry, link_target: Option<&str>) {
        self.formatter.format_entry(entry, link_target);
    }

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_complete(&mut self, _tally: &ArchiveTally) {}
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
#[allow(clippy::cast_precision_loss)]
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
