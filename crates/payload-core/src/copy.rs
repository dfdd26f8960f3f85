//! Bounded-memory copy of entry payloads out of a forward stream.
//!
//! File payloads can be gigabytes long, so they are moved to their
//! destination in pieces no larger than the reusable [`CopyBuffer`].

use std::io::Write;

use crate::PayloadError;
use crate::Result;
use crate::config::DEFAULT_COPY_BUFFER_SIZE;
use crate::io::ForwardStream;

/// Reusable heap buffer for payload copies.
///
/// Allocated once per extraction and shared by every file entry.
///
/// # Examples
///
/// ```
/// use payload_core::copy::{CopyBuffer, copy_exact};
/// use payload_core::io::MemoryStream;
///
/// let mut buffer = CopyBuffer::with_size(4);
/// let mut stream = MemoryStream::new(b"abcdefgh".to_vec());
/// let mut out = Vec::new();
///
/// let copied = copy_exact(&mut stream, &mut out, 6, &mut buffer, |_| {})?;
/// assert_eq!(copied, 6);
/// assert_eq!(out, b"abcdef");
/// # Ok::<(), payload_core::PayloadError>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Creates a buffer of [`DEFAULT_COPY_BUFFER_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(DEFAULT_COPY_BUFFER_SIZE)
    }

    /// Creates a buffer of `size` bytes, clamped to `1..=1 MiB`.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size.clamp(1, DEFAULT_COPY_BUFFER_SIZE)],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies exactly `size` bytes from `stream` to `writer`.
///
/// `on_chunk` is invoked with the length of every piece written, which lets
/// callers drive progress reporting without a second pass.
///
/// # Errors
///
/// Returns [`PayloadError::Format`] if the stream ends before `size` bytes
/// were copied, and [`PayloadError::Io`] if writing fails.
pub fn copy_exact<S, W, F>(
    stream: &mut S,
    writer: &mut W,
    size: u64,
    buffer: &mut CopyBuffer,
    mut on_chunk: F,
) -> Result<u64>
where
    S: ForwardStream + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut remaining = size;
    while remaining > 0 {
        let want = usize::try_from(remaining).map_or(buffer.size(), |r| r.min(buffer.size()));
        let got = stream.read(&mut buffer.buf[..want])?;
        if got > 0 {
            writer.write_all(&buffer.buf[..got])?;
            on_chunk(got as u64);
            remaining -= got as u64;
        }
        if got < want {
            return Err(PayloadError::format(format!(
                "truncated payload: expected {size} bytes, stream ended after {}",
                size - remaining
            )));
        }
    }
    Ok(size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::MemoryStream;

    #[test]
    fn test_copy_buffer_sizes() {
        assert_eq!(CopyBuffer::new().size(), 1024 * 1024);
        assert_eq!(CopyBuffer::default().size(), 1024 * 1024);
        assert_eq!(CopyBuffer::with_size(0).size(), 1);
        assert_eq!(CopyBuffer::with_size(usize::MAX).size(), 1024 * 1024);
    }

    #[test]
    fn test_copy_zero_bytes() {
        let mut stream = MemoryStream::new(b"abc".to_vec());
        let mut out = Vec::new();
        let copied = copy_exact(&mut stream, &mut out, 0, &mut CopyBuffer::with_size(2), |_| {})
            .unwrap();
        assert_eq!(copied, 0);
        assert!(out.is_empty());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_copy_leaves_following_bytes() {
        let mut stream = MemoryStream::new(b"payloadNEXT".to_vec());
        let mut out = Vec::new();
        copy_exact(&mut stream, &mut out, 7, &mut CopyBuffer::with_size(3), |_| {}).unwrap();
        assert_eq!(out, b"payload");
        assert_eq!(stream.read_vec(4).unwrap(), b"NEXT");
    }

    #[test]
    fn test_copy_reports_pieces() {
        let data = vec![0x5au8; 10];
        let mut stream = MemoryStream::new(data);
        let mut out = Vec::new();
        let mut pieces = Vec::new();
        copy_exact(&mut stream, &mut out, 10, &mut CopyBuffer::with_size(4), |n| {
            pieces.push(n);
        })
        .unwrap();
        assert_eq!(pieces, vec![4, 4, 2]);
    }

    #[test]
    fn test_copy_truncated_stream() {
        let mut stream = MemoryStream::new(b"short".to_vec());
        let mut out = Vec::new();
        let err = copy_exact(&mut stream, &mut out, 100, &mut CopyBuffer::with_size(64), |_| {})
            .unwrap_err();
        assert!(matches!(err, PayloadError::Format(_)));
        assert!(err.to_string().contains("after 5"));
    }

    #[test]
    fn test_copy_with_write_failure() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut stream = MemoryStream::new(vec![1u8; 16]);
        let result = copy_exact(
            &mut stream,
            &mut FailingWriter,
            16,
            &mut CopyBuffer::with_size(8),
            |_| {},
        );
        assert!(matches!(result, Err(PayloadError::Io(_))));
    }
}
