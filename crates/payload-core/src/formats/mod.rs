//! Payload format implementations.
//!
//! Two layers are stacked: [`pbzx`] turns the outer chunked container into a
//! forward-only byte stream, and [`payload`] walks the entry archive carried
//! inside it. [`compression`] decodes individual chunks.

pub mod compression;
pub mod payload;
pub mod pbzx;

pub use payload::ArchiveWalker;
pub use pbzx::ChunkedStream;
