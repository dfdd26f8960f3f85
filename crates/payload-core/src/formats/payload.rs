//! The inner payload archive: a flat run of entry headers and payloads.
//!
//! ```text
//! offset  size  field
//! 0       1     reserved marker (0x10)
//! 1       1     kind (1 = file, 2 = dir, 3 = symlink)
//! 2       8     payload size
//! 10      8     modification time (seconds)
//! 18      4     attribute flags
//! 22      2     name length
//! 24      2     owner id (signed)
//! 26      2     group id (signed)
//! 28      2     mode bits
//! 30      n     UTF-8 name, immediately followed by the payload
//! ```
//!
//! All integers are big-endian. The archive has no terminator: it ends
//! where the stream ends, exactly at a header boundary.

use log::debug;
use log::warn;

use crate::ExtractionConfig;
use crate::PayloadError;
use crate::Result;
use crate::extraction::EntrySink;
use crate::io::ForwardStream;
use crate::report::ArchiveTally;
use crate::types::ENTRY_HEADER_LEN;
use crate::types::ENTRY_MARKER;
use crate::types::Entry;
use crate::types::EntryKind;

/// Reads one entry header and its name from `stream`.
///
/// Returns `Ok(None)` when the stream is exhausted exactly at a header
/// boundary, which is how every payload ends.
///
/// # Errors
///
/// Returns [`PayloadError::Format`] if the header or name is cut short or
/// the name is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use payload_core::formats::payload::parse_header;
/// use payload_core::io::MemoryStream;
/// use payload_core::test_utils::EntryBuilder;
/// use payload_core::EntryKind;
///
/// let bytes = EntryBuilder::file("x.txt", b"abcd").encode();
/// let mut stream = MemoryStream::new(bytes);
///
/// let entry = parse_header(&mut stream)?.expect("one entry");
/// assert_eq!(entry.kind, EntryKind::File);
/// assert_eq!(entry.name, "x.txt");
/// assert_eq!(entry.size, 4);
/// # Ok::<(), payload_core::PayloadError>(())
/// ```
pub fn parse_header<S: ForwardStream + ?Sized>(stream: &mut S) -> Result<Option<Entry>> {
    let mut raw = [0u8; ENTRY_HEADER_LEN];
    let got = stream.read(&mut raw)?;
    if got == 0 {
        return Ok(None);
    }
    if got < ENTRY_HEADER_LEN {
        return Err(PayloadError::format(format!(
            "truncated entry header: got {got} of {ENTRY_HEADER_LEN} bytes"
        )));
    }

    let name_len = u16::from_be_bytes([raw[22], raw[23]]);
    let name_bytes = stream.read_vec(u64::from(name_len))?;
    if name_bytes.len() < usize::from(name_len) {
        return Err(PayloadError::format(format!(
            "truncated entry name: expected {name_len} bytes, got {}",
            name_bytes.len()
        )));
    }
    let name = String::from_utf8(name_bytes)
        .map_err(|e| PayloadError::format(format!("entry name is not valid UTF-8: {e}")))?;

    Ok(Some(Entry {
        marker: raw[0],
        kind: EntryKind::from_raw(raw[1]),
        size: u64::from_be_bytes(field(&raw, 2)),
        mtime: u64::from_be_bytes(field(&raw, 10)),
        flags: u32::from_be_bytes(field(&raw, 18)),
        uid: i16::from_be_bytes(field(&raw, 24)),
        gid: i16::from_be_bytes(field(&raw, 26)),
        mode: u16::from_be_bytes(field(&raw, 28)),
        name,
    }))
}

fn field<const N: usize>(raw: &[u8; ENTRY_HEADER_LEN], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&raw[offset..offset + N]);
    out
}

/// Drives extraction over a payload stream, one entry at a time.
///
/// For each entry the walker dispatches on its kind:
///
/// - [`EntryKind::Symlink`]: the payload is read as the UTF-8 link target
///   and handed to [`EntrySink::create_symlink`].
/// - [`EntryKind::File`]: the stream is lent to [`EntrySink::store_file`],
///   which must consume exactly the payload size.
/// - anything else: the payload is skipped.
///
/// Unknown kinds never stop the walk; they are skipped and tallied under
/// `other`.
///
/// # Examples
///
/// ```
/// use payload_core::extraction::DiscardSink;
/// use payload_core::formats::payload::ArchiveWalker;
/// use payload_core::io::MemoryStream;
/// use payload_core::test_utils::EntryBuilder;
///
/// let mut bytes = EntryBuilder::directory("usr").encode();
/// bytes.extend(EntryBuilder::file("usr/x", b"data").encode());
/// bytes.extend(EntryBuilder::symlink("usr/y", "x").encode());
///
/// let mut walker = ArchiveWalker::new(MemoryStream::new(bytes));
/// let tally = walker.walk(&mut DiscardSink::new())?;
/// assert_eq!((tally.files, tally.directories, tally.symlinks), (1, 1, 1));
/// # Ok::<(), payload_core::PayloadError>(())
/// ```
#[derive(Debug)]
pub struct ArchiveWalker<S> {
    stream: S,
    strict_marker: bool,
    tally: ArchiveTally,
    warnings: Vec<String>,
}

impl<S: ForwardStream> ArchiveWalker<S> {
    /// Creates a walker with default settings.
    #[must_use]
    pub const fn new(stream: S) -> Self {
        Self {
            stream,
            strict_marker: false,
            tally: ArchiveTally {
                files: 0,
                directories: 0,
                symlinks: 0,
                other: 0,
            },
            warnings: Vec::new(),
        }
    }

    /// Creates a walker honouring the relevant parts of `config`.
    #[must_use]
    pub fn with_config(stream: S, config: &ExtractionConfig) -> Self {
        Self::new(stream).strict_marker(config.strict_marker)
    }

    /// Makes a reserved-marker mismatch fatal instead of a warning.
    #[must_use]
    pub const fn strict_marker(mut self, strict: bool) -> Self {
        self.strict_marker = strict;
        self
    }

    /// Counts of entries processed so far.
    pub const fn tally(&self) -> &ArchiveTally {
        &self.tally
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns a reference to the underlying stream.
    pub const fn stream(&self) -> &S {
        &self.stream
    }

    /// Parses the next entry header, applying the marker policy.
    ///
    /// The entry's payload is left unread; callers using this directly must
    /// follow it with [`ArchiveWalker::process_entry`].
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let Some(entry) = parse_header(&mut self.stream)? else {
            return Ok(None);
        };

        if !entry.has_expected_marker() {
            let message = format!(
                "entry {:?}: reserved marker 0x{:02x} (expected 0x{ENTRY_MARKER:02x})",
                entry.name, entry.marker
            );
            if self.strict_marker {
                return Err(PayloadError::Format(message));
            }
            warn!("{message}");
            self.warnings.push(message);
        }

        Ok(Some(entry))
    }

    /// Consumes the payload of `entry` through `sink` and tallies it.
    pub fn process_entry<K: EntrySink + ?Sized>(&mut self, entry: &Entry, sink: &mut K) -> Result<()> {
        debug!("{} {} ({} bytes)", entry.kind, entry.name, entry.size);
        let start = self.stream.position();

        let link_target = match entry.kind {
            EntryKind::Symlink => {
                let bytes = self.stream.read_vec(entry.size)?;
                if (bytes.len() as u64) < entry.size {
                    return Err(truncated(entry, bytes.len() as u64));
                }
                let target = String::from_utf8(bytes).map_err(|e| {
                    PayloadError::format(format!(
                        "symlink target of {:?} is not valid UTF-8: {e}",
                        entry.name
                    ))
                })?;
                sink.create_symlink(entry, &target)?;
                Some(target)
            }
            EntryKind::File => {
                sink.store_file(entry, &mut self.stream, entry.size)?;
                let consumed = self.stream.position() - start;
                if consumed != entry.size {
                    return Err(PayloadError::format(format!(
                        "file {:?} consumed {consumed} of {} payload bytes",
                        entry.name, entry.size
                    )));
                }
                None
            }
            EntryKind::Directory | EntryKind::Unknown(_) => {
                let skipped = self.stream.skip(entry.size)?;
                if skipped < entry.size {
                    return Err(truncated(entry, skipped));
                }
                None
            }
        };

        self.tally.record(entry.kind);
        sink.entry_complete(entry, link_target.as_deref())
    }

    /// Walks every remaining entry until the end of the stream.
    ///
    /// Returns the final tally. Any error aborts the walk immediately; the
    /// stream cannot be resynchronized afterwards.
    pub fn walk<K: EntrySink + ?Sized>(&mut self, sink: &mut K) -> Result<ArchiveTally> {
        while let Some(entry) = self.next_entry()? {
            self.process_entry(&entry, sink)?;
        }
        sink.finish(&self.tally)?;
        Ok(self.tally)
    }
}

fn truncated(entry: &Entry, got: u64) -> PayloadError {
    PayloadError::format(format!(
        "truncated payload for {:?}: expected {} bytes, got {got}",
        entry.name, entry.size
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::extraction::DiscardSink;
    use crate::io::MemoryStream;
    use crate::test_utils::EntryBuilder;
    use crate::test_utils::encode_entries;

    /// Records every sink call instead of touching the filesystem.
    #[derive(Default)]
    struct RecordingSink {
        files: Vec<(String, Vec<u8>)>,
        links: Vec<(String, String)>,
        completed: Vec<String>,
        finished: Option<ArchiveTally>,
    }

    impl EntrySink for RecordingSink {
        fn store_file(
            &mut self,
            entry: &Entry,
            stream: &mut dyn ForwardStream,
            size: u64,
        ) -> Result<()> {
            let data = stream.read_vec(size)?;
            self.files.push((entry.name.clone(), data));
            Ok(())
        }

        fn create_symlink(&mut self, entry: &Entry, target: &str) -> Result<()> {
            self.links.push((entry.name.clone(), target.to_string()));
            Ok(())
        }

        fn entry_complete(&mut self, entry: &Entry, _link_target: Option<&str>) -> Result<()> {
            self.completed.push(entry.name.clone());
            Ok(())
        }

        fn finish(&mut self, tally: &ArchiveTally) -> Result<()> {
            self.finished = Some(*tally);
            Ok(())
        }
    }

    /// Reads fewer bytes than it is asked to.
    struct ShortReadSink;

    impl EntrySink for ShortReadSink {
        fn store_file(&mut self, _: &Entry, stream: &mut dyn ForwardStream, size: u64) -> Result<()> {
            stream.skip(size.saturating_sub(1))?;
            Ok(())
        }

        fn create_symlink(&mut self, _: &Entry, _: &str) -> Result<()> {
            Ok(())
        }
    }

    fn walker_for(entries: &[EntryBuilder]) -> ArchiveWalker<MemoryStream<Vec<u8>>> {
        ArchiveWalker::new(MemoryStream::new(encode_entries(entries)))
    }

    #[test]
    fn test_parse_header_fields() {
        let bytes = EntryBuilder::file("dir/name", b"")
            .marker(0x10)
            .mtime(1_456_000_000)
            .flags(0x8000)
            .uid(-2)
            .gid(80)
            .mode(0o100_755)
            .encode();
        let mut stream = MemoryStream::new(bytes);
        let entry = parse_header(&mut stream).unwrap().unwrap();
        assert_eq!(entry.marker, 0x10);
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.mtime, 1_456_000_000);
        assert_eq!(entry.flags, 0x8000);
        assert_eq!(entry.uid, -2);
        assert_eq!(entry.gid, 80);
        assert_eq!(entry.mode, 0o100_755);
        assert_eq!(entry.name, "dir/name");
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_parse_header_end_of_stream() {
        let mut stream = MemoryStream::new(Vec::new());
        assert!(parse_header(&mut stream).unwrap().is_none());
    }

    #[test]
    fn test_parse_header_truncated() {
        let bytes = EntryBuilder::file("abc", b"").encode();
        for cut in [1, 15, ENTRY_HEADER_LEN - 1] {
            let mut stream = MemoryStream::new(bytes[..cut].to_vec());
            assert!(
                matches!(parse_header(&mut stream), Err(PayloadError::Format(_))),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn test_parse_header_truncated_name() {
        let bytes = EntryBuilder::file("abcdef", b"").encode();
        let mut stream = MemoryStream::new(bytes[..ENTRY_HEADER_LEN + 3].to_vec());
        let err = parse_header(&mut stream).unwrap_err();
        assert!(err.to_string().contains("truncated entry name"));
    }

    #[test]
    fn test_parse_header_invalid_utf8_name() {
        let bytes = EntryBuilder::file("", b"").raw_name(vec![0x66, 0xff, 0xfe]).encode();
        let mut stream = MemoryStream::new(bytes);
        assert!(matches!(
            parse_header(&mut stream),
            Err(PayloadError::Format(_))
        ));
    }

    #[test]
    fn test_walk_dispatches_by_kind() {
        let mut walker = walker_for(&[
            EntryBuilder::directory("etc"),
            EntryBuilder::file("etc/hosts", b"127.0.0.1 localhost\n"),
            EntryBuilder::symlink("etc/link", "hosts"),
            EntryBuilder::new(9, "mystery").payload(b"ignored bytes".to_vec()),
            EntryBuilder::file("last", b"z"),
        ]);
        let mut sink = RecordingSink::default();
        let tally = walker.walk(&mut sink).unwrap();

        assert_eq!(
            sink.files,
            vec![
                ("etc/hosts".to_string(), b"127.0.0.1 localhost\n".to_vec()),
                ("last".to_string(), b"z".to_vec()),
            ]
        );
        assert_eq!(sink.links, vec![("etc/link".to_string(), "hosts".to_string())]);
        assert_eq!(sink.completed.len(), 5);
        assert_eq!(tally.files, 2);
        assert_eq!(tally.directories, 1);
        assert_eq!(tally.symlinks, 1);
        assert_eq!(tally.other, 1);
        assert_eq!(tally.total(), 5);
        assert_eq!(sink.finished, Some(tally));
        assert_eq!(walker.stream().remaining(), 0);
    }

    #[test]
    fn test_directory_payload_is_skipped_exactly() {
        let mut walker = walker_for(&[
            EntryBuilder::directory("d").payload(vec![0xAA; 37]),
            EntryBuilder::file("f", b"after"),
        ]);
        let mut sink = RecordingSink::default();
        walker.walk(&mut sink).unwrap();
        assert_eq!(sink.files, vec![("f".to_string(), b"after".to_vec())]);
    }

    #[test]
    fn test_symlink_target_is_payload_text() {
        let mut walker = walker_for(&[EntryBuilder::symlink("link", "a/b/c")]);
        let entry = walker.next_entry().unwrap().unwrap();
        assert_eq!(entry.size, 5);
        let mut sink = RecordingSink::default();
        walker.process_entry(&entry, &mut sink).unwrap();
        assert_eq!(sink.links, vec![("link".to_string(), "a/b/c".to_string())]);
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_symlink_invalid_utf8_target() {
        let mut walker = walker_for(&[EntryBuilder::new(3, "bad").payload(vec![0xc3, 0x28])]);
        let result = walker.walk(&mut RecordingSink::default());
        assert!(matches!(result, Err(PayloadError::Format(_))));
    }

    #[test]
    fn test_truncated_symlink_target() {
        let mut bytes = EntryBuilder::symlink("l", "target").encode();
        bytes.truncate(bytes.len() - 2);
        let mut walker = ArchiveWalker::new(MemoryStream::new(bytes));
        let err = walker.walk(&mut RecordingSink::default()).unwrap_err();
        assert!(err.to_string().contains("truncated payload"));
    }

    #[test]
    fn test_truncated_directory_payload() {
        let mut bytes = EntryBuilder::directory("d").payload(vec![1; 10]).encode();
        bytes.truncate(bytes.len() - 1);
        let mut walker = ArchiveWalker::new(MemoryStream::new(bytes));
        assert!(matches!(
            walker.walk(&mut DiscardSink::new()),
            Err(PayloadError::Format(_))
        ));
    }

    #[test]
    fn test_truncated_file_payload() {
        let mut bytes = EntryBuilder::file("f", b"0123456789").encode();
        bytes.truncate(bytes.len() - 4);
        let mut walker = ArchiveWalker::new(MemoryStream::new(bytes));
        assert!(matches!(
            walker.walk(&mut DiscardSink::new()),
            Err(PayloadError::Format(_))
        ));
    }

    #[test]
    fn test_under_consuming_sink_is_detected() {
        let mut walker = walker_for(&[EntryBuilder::file("f", b"0123456789")]);
        let err = walker.walk(&mut ShortReadSink).unwrap_err();
        assert!(err.to_string().contains("consumed 9 of 10"));
    }

    #[test]
    fn test_marker_mismatch_is_warning_by_default() {
        let mut walker = walker_for(&[
            EntryBuilder::file("odd", b"x").marker(0x11),
            EntryBuilder::file("even", b"y"),
        ]);
        let tally = walker.walk(&mut RecordingSink::default()).unwrap();
        assert_eq!(tally.files, 2);
        assert_eq!(walker.warnings().len(), 1);
        assert!(walker.warnings()[0].contains("0x11"));
    }

    #[test]
    fn test_marker_mismatch_fatal_in_strict_mode() {
        let mut walker = walker_for(&[EntryBuilder::file("odd", b"x").marker(0x00)])
            .strict_marker(true);
        let result = walker.walk(&mut RecordingSink::default());
        assert!(matches!(result, Err(PayloadError::Format(_))));
    }

    #[test]
    fn test_with_config_strict() {
        let walker = ArchiveWalker::with_config(
            MemoryStream::new(Vec::new()),
            &ExtractionConfig::strict(),
        );
        assert!(walker.strict_marker);
    }

    #[test]
    fn test_empty_payload_walk() {
        let mut walker = walker_for(&[]);
        let mut sink = RecordingSink::default();
        let tally = walker.walk(&mut sink).unwrap();
        assert_eq!(tally, ArchiveTally::default());
        assert_eq!(sink.finished, Some(ArchiveTally::default()));
    }

    #[test]
    fn test_zero_size_entries() {
        let mut walker = walker_for(&[
            EntryBuilder::file("empty", b""),
            EntryBuilder::symlink("dangling", ""),
            EntryBuilder::directory("d"),
        ]);
        let mut sink = RecordingSink::default();
        let tally = walker.walk(&mut sink).unwrap();
        assert_eq!(tally.total(), 3);
        assert_eq!(sink.files, vec![("empty".to_string(), Vec::new())]);
        assert_eq!(sink.links, vec![("dangling".to_string(), String::new())]);
    }
}
