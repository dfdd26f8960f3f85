//! High-level public API for payload extraction and listing.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use log::info;

use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::Result;
use crate::extraction::DiscardSink;
use crate::extraction::DiskSink;
use crate::extraction::EntrySink;
use crate::formats::ArchiveWalker;
use crate::formats::ChunkedStream;
use crate::report::ArchiveTally;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::types::DestDir;

/// Extracts a payload file into `output_dir`.
///
/// With `output_dir` set to `None` the payload is walked in full but nothing
/// is written, which validates it end to end.
///
/// # Arguments
///
/// * `archive_path` - Path to the pbzx payload file
/// * `output_dir` - Directory receiving the extracted entries; created if
///   missing
/// * `config` - Extraction configuration
///
/// # Errors
///
/// Returns an error if:
/// - The payload file cannot be opened or read
/// - The outer container or an entry header is malformed or truncated
/// - A chunk fails to decompress
/// - An entry name would escape `output_dir`
/// - Writing to `output_dir` fails
///
/// # Examples
///
/// ```no_run
/// use payload_core::ExtractionConfig;
/// use payload_core::extract_payload;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let report = extract_payload("Payload", Some(Path::new("/tmp/out")), &config)?;
/// println!("{}", report.tally);
/// # Ok(())
/// # }
/// ```
pub fn extract_payload<P: AsRef<Path>>(
    archive_path: P,
    output_dir: Option<&Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionReport> {
    extract_payload_with_progress(archive_path, output_dir, config, &mut NoopProgress)
}

/// Extracts a payload file, reporting every entry to `progress`.
///
/// See [`extract_payload`] for details.
///
/// # Errors
///
/// Same as [`extract_payload`].
pub fn extract_payload_with_progress<P: AsRef<Path>>(
    archive_path: P,
    output_dir: Option<&Path>,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let archive_path = archive_path.as_ref();
    info!("reading payload {}", archive_path.display());

    let file = File::open(archive_path)?;
    let stream = ChunkedStream::new(BufReader::new(file))?;
    let mut walker = ArchiveWalker::with_config(stream, config);
    let mut report = ExtractionReport::new();

    if let Some(dir) = output_dir {
        let dest = DestDir::create(dir)?;
        info!("extracting to {}", dest.as_path().display());
        let mut sink = DiskSink::with_progress(dest, config, progress);
        report.tally = walker.walk(&mut sink)?;
        report.files_written = sink.files_written();
        report.symlinks_created = sink.symlinks_created();
        report.bytes_written = sink.bytes_written();
    } else {
        let mut sink = DiscardSink::with_progress(progress);
        report.tally = walker.walk(&mut sink)?;
    }

    report.chunks_decoded = walker.stream().chunks_decoded();
    for warning in walker.warnings() {
        report.add_warning(warning.clone());
    }
    report.duration = start.elapsed();
    info!(
        "{} ({} chunks in {:.2?})",
        report.tally, report.chunks_decoded, report.duration
    );

    Ok(report)
}

/// Walks a payload file without writing anything.
///
/// Every entry is reported to `progress` in payload order, with the link
/// target set for symlinks; this is what listing is built on.
///
/// # Errors
///
/// Same as [`extract_payload`], minus the output directory failures.
pub fn list_payload<P: AsRef<Path>>(
    archive_path: P,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    extract_payload_with_progress(archive_path, None, config, progress)
}

/// Walks the payload read from `reader` into a caller-supplied sink.
///
/// This is the composition point for custom destinations: `reader` yields
/// the raw pbzx bytes, and `sink` sees every entry in order.
///
/// # Errors
///
/// Returns the first error raised by the stream, the walker, or the sink.
///
/// # Examples
///
/// ```
/// use payload_core::extraction::DiscardSink;
/// use payload_core::test_utils::{EntryBuilder, build_payload};
/// use payload_core::{ExtractionConfig, walk_payload};
///
/// let data = build_payload(&[EntryBuilder::file("x.txt", b"abcd")], 16);
/// let tally = walk_payload(&data[..], &mut DiscardSink::new(), &ExtractionConfig::default())?;
/// assert_eq!(tally.files, 1);
/// # Ok::<(), payload_core::PayloadError>(())
/// ```
pub fn walk_payload<R: Read, K: EntrySink + ?Sized>(
    reader: R,
    sink: &mut K,
    config: &ExtractionConfig,
) -> Result<ArchiveTally> {
    let stream = ChunkedStream::new(reader)?;
    ArchiveWalker::with_config(stream, config).walk(sink)
}
