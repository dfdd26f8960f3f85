//! Streaming extraction of pbzx-wrapped installation payloads.
//!
//! A payload is two formats stacked on top of each other. The outer pbzx
//! container splits the data into independently xz-compressed chunks; the
//! bytes they decode to form a flat archive of entries, each a 30-byte
//! header, a name, and a payload. `payload-core` decodes the container one
//! chunk at a time and walks the archive in a single forward pass, so memory
//! stays bounded by one decoded chunk plus one copy buffer no matter how big
//! the payload is.
//!
//! # Examples
//!
//! ```no_run
//! use payload_core::ExtractionConfig;
//! use payload_core::extract_payload;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractionConfig::default();
//! let report = extract_payload("Payload", Some(Path::new("/output/dir")), &config)?;
//! println!("{}", report.tally);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod report;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract_payload;
pub use api::extract_payload_with_progress;
pub use api::list_payload;
pub use api::walk_payload;
pub use archive::ExtractionBuilder;
pub use archive::Payload;
pub use config::ExtractionConfig;
pub use error::PayloadError;
pub use error::Result;
pub use extraction::EntrySink;
pub use formats::ArchiveWalker;
pub use formats::ChunkedStream;
pub use io::ForwardStream;
pub use report::ArchiveTally;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::Entry;
pub use types::EntryKind;
