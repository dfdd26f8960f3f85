//! Payload entry kind enumeration.

use std::fmt;

/// Kind of an entry in the inner payload archive.
///
/// The payload format is defined externally, so any kind byte outside the
/// three known values is kept verbatim in [`EntryKind::Unknown`] instead of
/// being rejected.
///
/// # Examples
///
/// ```
/// use payload_core::EntryKind;
///
/// assert_eq!(EntryKind::from_raw(1), EntryKind::File);
/// assert_eq!(EntryKind::from_raw(3), EntryKind::Symlink);
/// assert_eq!(EntryKind::from_raw(7), EntryKind::Unknown(7));
/// assert_eq!(EntryKind::Unknown(7).as_raw(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file; the payload is the file content.
    File,

    /// Directory; the payload carries no meaning and is skipped.
    Directory,

    /// Symbolic link; the payload is the UTF-8 link target.
    Symlink,

    /// Kind byte not known to this implementation.
    Unknown(u8),
}

impl EntryKind {
    /// Raw kind byte for regular files.
    pub const RAW_FILE: u8 = 1;
    /// Raw kind byte for directories.
    pub const RAW_DIRECTORY: u8 = 2;
    /// Raw kind byte for symbolic links.
    pub const RAW_SYMLINK: u8 = 3;

    /// Maps a raw kind byte to its variant.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            Self::RAW_FILE => Self::File,
            Self::RAW_DIRECTORY => Self::Directory,
            Self::RAW_SYMLINK => Self::Symlink,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw kind byte as stored in the header.
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::File => Self::RAW_FILE,
            Self::Directory => Self::RAW_DIRECTORY,
            Self::Symlink => Self::RAW_SYMLINK,
            Self::Unknown(raw) => raw,
        }
    }

    /// Short name used in listings: `file`, `dir`, `link`, or `?xx?`.
    #[must_use]
    pub fn short_name(self) -> String {
        match self {
            Self::File => "file".to_string(),
            Self::Directory => "dir".to_string(),
            Self::Symlink => "link".to_string(),
            Self::Unknown(raw) => format!("?{raw:02x}?"),
        }
    }
}

impl From<u8> for EntryKind {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}
