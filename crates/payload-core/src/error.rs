//! Error types for payload extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PayloadError`.
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Errors that can occur while decoding or extracting a payload.
///
/// Every variant is fatal to the walk that produced it: once the stream is
/// desynchronized there is no way to find the next entry header again.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// I/O operation failed, either on the raw input or on the destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload structure is corrupted, truncated, or not a payload at all.
    #[error("invalid payload: {0}")]
    Format(String),

    /// The single-chunk codec rejected the bytes of an outer chunk.
    #[error("failed to decompress chunk {chunk}: {source}")]
    Decompression {
        /// Zero-based index of the chunk that failed.
        chunk: u64,
        /// Underlying codec error.
        #[source]
        source: std::io::Error,
    },

    /// Operation not supported by a forward-only stream.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Extraction was requested without the settings it needs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Entry name would resolve outside the output directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: PathBuf,
    },
}

impl PayloadError {
    /// Creates a `Format` error from anything displayable.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Returns `true` if this error means the payload bytes themselves are
    /// bad (as opposed to the environment failing around them).
    ///
    /// # Examples
    ///
    /// ```
    /// use payload_core::PayloadError;
    ///
    /// let err = PayloadError::format("bad magic");
    /// assert!(err.is_stream_corruption());
    ///
    /// let err = PayloadError::UnsupportedOperation("backward seek");
    /// assert!(!err.is_stream_corruption());
    /// ```
    #[must_use]
    pub const fn is_stream_corruption(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Decompression { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload_core::PayloadError;
    ///
    /// let err = PayloadError::format("truncated header");
    /// assert_eq!(err.context(), Some("truncated header"));
    ///
    /// let err = PayloadError::Io(std::io::Error::other("disk full"));
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Format(msg) => Some(msg),
            Self::UnsupportedOperation(op) => Some(op),
            Self::InvalidConfiguration(msg) => Some(msg),
            _ => None,
        }
    }
}
