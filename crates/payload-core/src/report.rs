//! Extraction operation reporting.

use std::fmt;
use std::time::Duration;

use crate::types::Entry;
use crate::types::EntryKind;

/// Per-kind entry counts accumulated over one walk.
///
/// # Examples
///
/// ```
/// use payload_core::{ArchiveTally, EntryKind};
///
/// let mut tally = ArchiveTally::default();
/// tally.record(EntryKind::File);
/// tally.record(EntryKind::Unknown(9));
/// assert_eq!(tally.files, 1);
/// assert_eq!(tally.other, 1);
/// assert_eq!(tally.total(), 2);
/// assert_eq!(tally.to_string(), "Found 1 files, 0 dirs, 0 links, 1 other");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ArchiveTally {
    /// Regular file entries.
    pub files: usize,
    /// Directory entries.
    pub directories: usize,
    /// Symbolic link entries.
    pub symlinks: usize,
    /// Entries of any unrecognized kind.
    pub other: usize,
}

impl ArchiveTally {
    /// Counts one entry of the given kind.
    pub fn record(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::File => self.files += 1,
            EntryKind::Directory => self.directories += 1,
            EntryKind::Symlink => self.symlinks += 1,
            EntryKind::Unknown(_) => self.other += 1,
        }
    }

    /// Total number of entries counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.files + self.directories + self.symlinks + self.other
    }
}

impl fmt::Display for ArchiveTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} files, {} dirs, {} links",
            self.files, self.directories, self.symlinks
        )?;
        if self.other > 0 {
            write!(f, ", {} other", self.other)?;
        }
        Ok(())
    }
}

/// Report of a payload extraction or listing run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Entry counts by kind.
    pub tally: ArchiveTally,

    /// Number of files written to disk.
    pub files_written: usize,

    /// Number of symlinks created on disk.
    pub symlinks_created: usize,

    /// Total file bytes written to disk.
    pub bytes_written: u64,

    /// Number of outer chunks decoded.
    pub chunks_decoded: u64,

    /// Duration of the whole run.
    pub duration: Duration,

    /// Non-fatal anomalies, such as unexpected header markers.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of entries walked.
    #[must_use]
    pub const fn total_entries(&self) -> usize {
        self.tally.total()
    }
}

/// Callback trait for per-entry progress during a walk.
///
/// # Examples
///
/// ```
/// use payload_core::{ArchiveTally, Entry, ProgressCallback};
///
/// struct Lister;
///
/// impl ProgressCallback for Lister {
///     fn on_entry(&mut self, entry: &Entry, link_target: Option<&str>) {
///         match link_target {
///             Some(target) => println!("{} -> {target}", entry.name),
///             None => println!("{}", entry.name),
///         }
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_complete(&mut self, tally: &ArchiveTally) {
///         println!("{tally}");
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called after an entry has been fully processed.
    ///
    /// `link_target` is set for symlink entries.
    fn on_entry(&mut self, entry: &Entry, link_target: Option<&str>);

    /// Called as file bytes are written to disk.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called once when the walk reaches the end of the payload.
    fn on_complete(&mut self, tally: &ArchiveTally);
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for &mut T {
    fn on_entry(&mut self, entry: &Entry, link_target: Option<&str>) {
        (**self).on_entry(entry, link_target);
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        (**self).on_bytes_written(bytes);
    }

    fn on_complete(&mut self, tally: &ArchiveTally) {
        (**self).on_complete(tally);
    }
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry(&mut self, _entry: &Entry, _link_target: Option<&str>) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_complete(&mut self, _tally: &ArchiveTally) {}
}
