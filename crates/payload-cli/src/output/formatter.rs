//! Output formatter trait for CLI results.

use anyhow::Result;
use payload_core::Entry;
use payload_core::ExtractionReport;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format one walked entry, in payload order
    fn format_entry(&self, entry: &Entry, link_target: Option<&str>);

    /// Format extraction result; `output_dir` is `None` for a validation-only run
    fn format_extraction_result(
        &self,
        report: &ExtractionReport,
        output_dir: Option<&Path>,
    ) -> Result<()>;

    /// Format the summary closing a listing
    fn format_listing_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);

    /// Format the error that ended `operation`
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
