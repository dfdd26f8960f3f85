//! The sink trait and the discarding sink.

use crate::PayloadError;
use crate::Result;
use crate::io::ForwardStream;
use crate::report::ArchiveTally;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::types::Entry;

/// Receives the entries of a payload as the walker reaches them.
///
/// Payload bytes are only available during the call that receives them;
/// the stream cannot be rewound afterwards.
pub trait EntrySink {
    /// Handles a regular file.
    ///
    /// Must consume exactly `size` bytes from `stream`; the walker checks
    /// this and fails the walk otherwise.
    fn store_file(&mut self, entry: &Entry, stream: &mut dyn ForwardStream, size: u64)
    -> Result<()>;

    /// Handles a symlink whose target has already been read and decoded.
    fn create_symlink(&mut self, entry: &Entry, target: &str) -> Result<()>;

    /// Called after every entry, whatever its kind, once its payload has
    /// been consumed.
    fn entry_complete(&mut self, _entry: &Entry, _link_target: Option<&str>) -> Result<()> {
        Ok(())
    }

    /// Called once after the last entry.
    fn finish(&mut self, _tally: &ArchiveTally) -> Result<()> {
        Ok(())
    }
}

impl<K: EntrySink + ?Sized> EntrySink for &mut K {
    fn store_file(
        &mut self,
        entry: &Entry,
        stream: &mut dyn ForwardStream,
        size: u64,
    ) -> Result<()> {
        (**self).store_file(entry, stream, size)
    }

    fn create_symlink(&mut self, entry: &Entry, target: &str) -> Result<()> {
        (**self).create_symlink(entry, target)
    }

    fn entry_complete(&mut self, entry: &Entry, link_target: Option<&str>) -> Result<()> {
        (**self).entry_complete(entry, link_target)
    }

    fn finish(&mut self, tally: &ArchiveTally) -> Result<()> {
        (**self).finish(tally)
    }
}

/// Sink that writes nothing and only reports entries to a progress callback.
///
/// File payloads are skipped, so listing a payload costs decompression but
/// no disk writes.
#[derive(Debug, Default)]
pub struct DiscardSink<P = NoopProgress> {
    progress: P,
}

impl DiscardSink<NoopProgress> {
    /// Creates a sink with no progress reporting.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            progress: NoopProgress,
        }
    }
}

impl<P: ProgressCallback> DiscardSink<P> {
    /// Creates a sink that reports every entry to `progress`.
    pub const fn with_progress(progress: P) -> Self {
        Self { progress }
    }

    /// Consumes the sink, returning the progress callback.
    pub fn into_progress(self) -> P {
        self.progress
    }
}

impl<P: ProgressCallback> EntrySink for DiscardSink<P> {
    fn store_file(
        &mut self,
        entry: &Entry,
        stream: &mut dyn ForwardStream,
        size: u64,
    ) -> Result<()> {
        let skipped = stream.skip(size)?;
        if skipped < size {
            return Err(PayloadError::format(format!(
                "truncated payload for {:?}: expected {size} bytes, got {skipped}",
                entry.name
            )));
        }
        Ok(())
    }

    fn create_symlink(&mut self, _entry: &Entry, _target: &str) -> Result<()> {
        Ok(())
    }

    fn entry_complete(&mut self, entry: &Entry, link_target: Option<&str>) -> Result<()> {
        self.progress.on_entry(entry, link_target);
        Ok(())
    }

    fn finish(&mut self, tally: &ArchiveTally) -> Result<()> {
        self.progress.on_complete(tally);
        Ok(())
    }
}
