//! Typed records and wrappers used throughout payload extraction.
//!
//! - [`Entry`]: immutable parsed entry header
//! - [`EntryKind`]: tagged entry kind, forward compatible with unknown kinds
//! - [`DestDir`]: validated output directory that keeps entry paths beneath it

pub mod dest_dir;
pub mod entry;
pub mod entry_kind;

pub use dest_dir::DestDir;
pub use entry::ENTRY_HEADER_LEN;
pub use entry::ENTRY_MARKER;
pub use entry::Entry;
pub use entry_kind::EntryKind;
