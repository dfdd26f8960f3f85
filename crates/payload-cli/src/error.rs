//! Error conversion utilities for CLI.
//!
//! Converts payload-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use payload_core::PayloadError;
use std::path::Path;

/// Converts `PayloadError` to user-friendly anyhow error with context
pub fn convert_payload_error(err: PayloadError, payload: &Path) -> anyhow::Error {
    match err {
        PayloadError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Payload '{}' contains an entry escaping the output directory: '{}'\n\
                 HINT: This payload may be malicious. Do not extract from untrusted sources.",
                payload.display(),
                path.display()
            )
        }
        PayloadError::Format(reason) => {
            anyhow!(
                "Invalid payload '{}': {}\n\
                 HINT: The file may be truncated, or it is not a pbzx payload.",
                payload.display(),
                reason
            )
        }
        PayloadError::Decompression { chunk, source } => {
            anyhow!(
                "Failed to decompress chunk {} of '{}': {}\n\
                 HINT: The payload is corrupted; download it again.",
                chunk,
                payload.display(),
                source
            )
        }
        PayloadError::InvalidConfiguration(reason) => {
            anyhow!("Invalid configuration for '{}': {}", payload.display(), reason)
        }
        PayloadError::Io(io_err) if io_err.kind() == std::io::ErrorKind::AlreadyExists => {
            anyhow!(
                "I/O error while processing '{}': {}\n\
                 HINT: Use --force to overwrite existing files.",
                payload.display(),
                io_err
            )
        }
        PayloadError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                payload.display(),
                io_err
            )
        }
        PayloadError::UnsupportedOperation(_) => anyhow::Error::from(err)
            .context(format!("Error processing payload '{}'", payload.display())),
    }
}

/// Adds context to a generic error about payload operations
pub fn add_payload_context<T>(result: Result<T, PayloadError>, payload: &Path) -> Result<T> {
    result.map_err(|e| convert_payload_error(e, payload))
}
