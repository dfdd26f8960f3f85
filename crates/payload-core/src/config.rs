//! Extraction configuration.

/// Default size of the buffer used to copy file payloads to disk (1 MiB).
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Options controlling how a payload is walked and written out.
///
/// The defaults reproduce the classic behaviour of the payload tools: marker
/// mismatches are only warned about, files are written with the process
/// umask, and existing files are not replaced.
///
/// # Examples
///
/// ```
/// use payload_core::ExtractionConfig;
///
/// let config = ExtractionConfig {
///     preserve_permissions: true,
///     ..Default::default()
/// };
/// assert!(!config.strict_marker);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Treat a reserved-marker mismatch in an entry header as a fatal error.
    pub strict_marker: bool,

    /// Size of the copy buffer for file payloads, clamped to
    /// `1..=DEFAULT_COPY_BUFFER_SIZE` when used.
    pub copy_buffer_size: usize,

    /// Apply the entry mode bits to extracted files.
    pub preserve_permissions: bool,

    /// Apply the entry modification time to extracted files.
    pub preserve_mtime: bool,

    /// Replace files or links that already exist at an entry's path.
    pub overwrite: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strict_marker: false,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            preserve_permissions: false,
            preserve_mtime: false,
            overwrite: false,
        }
    }
}

impl ExtractionConfig {
    /// Creates a configuration that rejects unexpected header markers.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_marker: true,
            ..Default::default()
        }
    }

    /// Sets strict marker checking.
    #[must_use]
    pub const fn with_strict_marker(mut self, strict: bool) -> Self {
        self.strict_marker = strict;
        self
    }

    /// Sets permission preservation.
    #[must_use]
    pub const fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets modification time preservation.
    #[must_use]
    pub const fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Sets whether existing files are replaced.
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the copy buffer size.
    #[must_use]
    pub const fn with_copy_buffer_size(mut self, size: usize) -> Self {
        self.copy_buffer_size = size;
        self
    }

    /// Returns the copy buffer size actually used for file payloads.
    #[must_use]
    pub fn effective_copy_buffer_size(&self) -> usize {
        self.copy_buffer_size.clamp(1, DEFAULT_COPY_BUFFER_SIZE)
    }
}
