//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use console::Term;
use console::style;
use payload_core::Entry;
use payload_core::ExtractionReport;
use payload_core::types::ENTRY_MARKER;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    /// One listing row: kind, mode, flags, owner, size, time, name.
    fn entry_line(entry: &Entry, link_target: Option<&str>) -> String {
        let target = link_target.map_or_else(String::new, |t| format!(" -> {t}"));
        format!(
            "{:<4} {} [{:08x}] {:5}{:5} {:12} {}  {}{}",
            entry.kind.short_name(),
            entry.mode_string(),
            entry.flags,
            entry.uid,
            entry.gid,
            entry.size,
            ctime(entry.mtime),
            entry.name,
            target
        )
    }
}

/// Renders seconds since the epoch like C `ctime`, in UTC and without the
/// trailing newline: `Thu Jan  1 00:00:00 1970`. Timestamps chrono cannot
/// represent fall back to the raw second count.
fn ctime(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(
            || secs.to_string(),
            |time| time.format("%a %b %e %H:%M:%S %Y").to_string(),
        )
}

impl OutputFormatter for HumanFormatter {
    fn format_entry(&self, entry: &Entry, link_target: Option<&str>) {
        if self.quiet {
            return;
        }

        let _ = self.term.write_line(&Self::entry_line(entry, link_target));
        if !entry.has_expected_marker() {
            let _ = self.term.write_line(&format!(
                "NOTE: field unk1 == 0x{:02x} (expected 0x{ENTRY_MARKER:02x})",
                entry.marker
            ));
        }
    }

    fn format_extraction_result(
        &self,
        report: &ExtractionReport,
        output_dir: Option<&Path>,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let headline = match output_dir {
            Some(dir) => format!("Extraction complete: {}", dir.display()),
            None => "Payload verified (nothing written)".to_string(),
        };
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {headline}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(&headline);
        }

        if output_dir.is_some() {
            let _ = self
                .term
                .write_line(&format!("  Files written: {}", report.files_written));
            let _ = self
                .term
                .write_line(&format!("  Symlinks: {}", report.symlinks_created));
            let _ = self.term.write_line(&format!(
                "  Total size: {}",
                Self::format_size(report.bytes_written)
            ));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Chunks decoded: {}", report.chunks_decoded));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        for warning in &report.warnings {
            self.format_warning(warning);
        }

        let _ = self.term.write_line(&report.tally.to_string());
        Ok(())
    }

    fn format_listing_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&report.tally.to_string());
        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }

    // `main` already reports the error on stderr.
    fn format_error(&self, _operation: &str, _error: &anyhow::Error) {}
}
