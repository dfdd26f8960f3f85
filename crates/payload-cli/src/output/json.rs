//! JSON output formatter for machine-readable results.
//!
//! Entries are buffered as they are walked and emitted together with the
//! summary, so stdout always carries exactly one JSON document.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use payload_core::ArchiveTally;
use payload_core::Entry;
use payload_core::ExtractionReport;
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::io::{self};
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonEntry {
    kind: String,
    name: String,
    size: u64,
    mode: String,
    flags: u32,
    uid: i16,
    gid: i16,
    mtime: u64,
    marker: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<String>,
}

impl JsonEntry {
    fn new(entry: &Entry, link_target: Option<&str>) -> Self {
        Self {
            kind: entry.kind.short_name(),
            name: entry.name.clone(),
            size: entry.size,
            mode: entry.mode_string(),
            flags: entry.flags,
            uid: entry.uid,
            gid: entry.gid,
            mtime: entry.mtime,
            marker: entry.marker,
            link_target: link_target.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonTally {
    files: usize,
    directories: usize,
    symlinks: usize,
    other: usize,
}

impl From<&ArchiveTally> for JsonTally {
    fn from(tally: &ArchiveTally) -> Self {
        Self {
            files: tally.files,
            directories: tally.directories,
            symlinks: tally.symlinks,
            other: tally.other,
        }
    }
}

#[derive(Default)]
pub struct JsonFormatter {
    entries: RefCell<Vec<JsonEntry>>,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn take_entries(&self) -> Vec<JsonEntry> {
        self.entries.take()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_entry(&self, entry: &Entry, link_target: Option<&str>) {
        self.entries
            .borrow_mut()
            .push(JsonEntry::new(entry, link_target));
    }

    fn format_extraction_result(
        &self,
        report: &ExtractionReport,
        output_dir: Option<&Path>,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            #[serde(skip_serializing_if = "Option::is_none")]
            output_dir: Option<String>,
            tally: JsonTally,
            files_written: usize,
            symlinks_created: usize,
            bytes_written: u64,
            chunks_decoded: u64,
            duration_ms: u128,
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            entries: Vec<JsonEntry>,
        }

        let data = ExtractionOutput {
            output_dir: output_dir.map(|dir| dir.display().to_string()),
            tally: JsonTally::from(&report.tally),
            files_written: report.files_written,
            symlinks_created: report.symlinks_created,
            bytes_written: report.bytes_written,
            chunks_decoded: report.chunks_decoded,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
            entries: self.take_entries(),
        };

        let output = JsonOutput::success("extract", data);
        Self::output(&output)
    }

    fn format_listing_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ListingOutput {
            entries: Vec<JsonEntry>,
            tally: JsonTally,
            warnings: Vec<String>,
        }

        let data = ListingOutput {
            entries: self.take_entries(),
            tally: JsonTally::from(&report.tally),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("list", data);
        Self::output(&output)
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
