//! Destinations for walked entries.
//!
//! [`ArchiveWalker`](crate::formats::payload::ArchiveWalker) knows how to
//! find entries; an [`EntrySink`] decides what happens to them.
//! [`DiskSink`] materializes them under an output directory and
//! [`DiscardSink`] only observes them, which is what listing uses.

pub mod disk;
pub mod sink;

pub use disk::DiskSink;
pub use sink::DiscardSink;
pub use sink::EntrySink;
