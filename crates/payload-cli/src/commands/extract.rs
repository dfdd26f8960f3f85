//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_payload_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::progress::EntryPrinter;
use anyhow::Result;
use log::debug;
use payload_core::ExtractionConfig;
use payload_core::NoopProgress;
use payload_core::ProgressCallback;
use payload_core::extract_payload_with_progress;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let config = ExtractionConfig::default()
        .with_strict_marker(args.strict)
        .with_preserve_permissions(args.preserve_permissions)
        .with_preserve_mtime(args.preserve_mtime)
        .with_overwrite(args.force);
    let output_dir = args.output_dir.as_deref();
    debug!("extract {} with {config:?}", args.payload.display());

    // Listing rows and the spinner would interleave on a terminal.
    let mut printer;
    let mut spinner;
    let mut noop = NoopProgress;
    let progress: &mut dyn ProgressCallback = if args.list {
        printer = EntryPrinter::new(formatter);
        &mut printer
    } else if show_progress && CliProgress::should_show() {
        spinner = CliProgress::new("Extracting");
        &mut spinner
    } else {
        &mut noop
    };

    let report = add_payload_context(
        extract_payload_with_progress(&args.payload, output_dir, &config, progress),
        &args.payload,
    )?;

    formatter.format_extraction_result(&report, output_dir)?;

    Ok(())
}
