//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_payload_context;
use crate::output::OutputFormatter;
use crate::progress::EntryPrinter;
use anyhow::Result;
use log::debug;
use payload_core::ExtractionConfig;
use payload_core::list_payload;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = ExtractionConfig::default().with_strict_marker(args.strict);
    debug!("list {} with {config:?}", args.payload.display());

    let mut printer = EntryPrinter::new(formatter);
    let report = add_payload_context(
        list_payload(&args.payload, &config, &mut printer),
        &args.payload,
    )?;

    formatter.format_listing_result(&report)?;

    Ok(())
}
