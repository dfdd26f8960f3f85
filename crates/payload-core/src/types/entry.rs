//! Parsed payload entry record.

use std::time::Duration;
use std::time::SystemTime;

use super::EntryKind;

/// Marker byte every entry header is expected to start with.
pub const ENTRY_MARKER: u8 = 0x10;

/// Size of the fixed part of an entry header, excluding the name.
pub const ENTRY_HEADER_LEN: usize = 30;

/// One record of the inner payload archive.
///
/// An `Entry` describes the header only; its payload (`size` bytes) follows
/// it in the stream and is consumed by the walker, never stored here.
///
/// # Examples
///
/// ```
/// use payload_core::{Entry, EntryKind};
///
/// let entry = Entry {
///     marker: 0x10,
///     kind: EntryKind::File,
///     size: 4,
///     mtime: 0,
///     flags: 0,
///     uid: 0,
///     gid: 0,
///     mode: 0o100644,
///     name: "x.txt".to_string(),
/// };
/// assert!(entry.has_expected_marker());
/// assert_eq!(entry.permissions(), 0o644);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Reserved leading byte, normally [`ENTRY_MARKER`].
    pub marker: u8,
    /// Entry kind.
    pub kind: EntryKind,
    /// Length of the payload that follows the header.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    /// Attribute flags (observed values include 0, 0x20 and 0x8000).
    pub flags: u32,
    /// Numeric owner id.
    pub uid: i16,
    /// Numeric group id.
    pub gid: i16,
    /// POSIX mode bits, including the file type bits when present.
    pub mode: u16,
    /// Entry path relative to the payload root.
    pub name: String,
}

impl Entry {
    /// Returns `true` if the reserved marker byte has its expected value.
    #[must_use]
    pub const fn has_expected_marker(&self) -> bool {
        self.marker == ENTRY_MARKER
    }

    /// Returns the permission bits (`mode & 0o7777`).
    #[must_use]
    pub fn permissions(&self) -> u32 {
        u32::from(self.mode) & 0o7777
    }

    /// Returns the modification time as a `SystemTime`, if representable.
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(self.mtime))
    }

    /// Returns the mode rendered as six octal digits, e.g. `100644`.
    #[must_use]
    pub fn mode_string(&self) -> String {
        format!("{:06o}", self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mode: u16, marker: u8) -> Entry {
        Entry {
            marker,
            kind: EntryKind::File,
            size: 0,
            mtime: 86_400,
            flags: 0x20,
            uid: -2,
            gid: 20,
            mode,
            name: "a/b".to_string(),
        }
    }

    #[test]
    fn test_marker_check() {
        assert!(sample(0, ENTRY_MARKER).has_expected_marker());
        assert!(!sample(0, 0x11).has_expected_marker());
    }

    #[test]
    fn test_permissions_strip_type_bits() {
        assert_eq!(sample(0o100_755, ENTRY_MARKER).permissions(), 0o755);
        assert_eq!(sample(0o041_777, ENTRY_MARKER).permissions(), 0o1777);
    }

    #[test]
    fn test_mode_string() {
        assert_eq!(sample(0o100_644, ENTRY_MARKER).mode_string(), "100644");
        assert_eq!(sample(0o755, ENTRY_MARKER).mode_string(), "000755");
    }

    #[test]
    fn test_modified() {
        let modified = sample(0, ENTRY_MARKER).modified();
        assert_eq!(
            modified,
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400))
        );
    }
}
