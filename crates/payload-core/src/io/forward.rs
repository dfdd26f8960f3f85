//! Forward-only byte stream contract.
//!
//! The inner payload walker never needs more than two things from its input:
//! pull the next bytes, or drop the next bytes. [`ForwardStream`] captures
//! exactly that, so the walker can run over the decompressing
//! [`ChunkedStream`](crate::formats::pbzx::ChunkedStream) or over an
//! in-memory [`MemoryStream`] in tests.

use crate::PayloadError;
use crate::Result;

/// Largest piece [`ForwardStream::read_vec`] grows its buffer by at once.
const READ_VEC_STEP: usize = 64 * 1024;

/// Sequential byte source supporting reads and forward skips only.
///
/// # End of stream
///
/// Neither `read` nor `skip` treat the end of the stream as an error. Both
/// return how many bytes they actually consumed, and callers that need an
/// exact amount must compare it themselves.
pub trait ForwardStream {
    /// Reads up to `buf.len()` bytes into `buf`.
    ///
    /// Returns fewer than `buf.len()` bytes only when the stream is
    /// exhausted; a return of 0 for a non-empty buffer means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Discards the next `n` bytes without materializing them.
    ///
    /// Returns the number of bytes skipped, less than `n` only at end of
    /// stream.
    fn skip(&mut self, n: u64) -> Result<u64>;

    /// Number of bytes consumed (read or skipped) since the stream started.
    fn position(&self) -> u64;

    /// Relative seek, as offered by file-like objects.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::UnsupportedOperation`] for negative offsets.
    fn seek_relative(&mut self, offset: i64) -> Result<u64> {
        let forward = u64::try_from(offset).map_err(|_| {
            PayloadError::UnsupportedOperation("backward seek on a forward-only stream")
        })?;
        self.skip(forward)
    }

    /// Reads up to `n` bytes into a new vector.
    ///
    /// The vector grows as data arrives, so a bogus `n` taken from a corrupt
    /// header cannot trigger a huge up-front allocation.
    fn read_vec(&mut self, n: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut remaining = n;
        while remaining > 0 {
            let step = usize::try_from(remaining).map_or(READ_VEC_STEP, |r| r.min(READ_VEC_STEP));
            let start = out.len();
            out.resize(start + step, 0);
            let got = self.read(&mut out[start..])?;
            out.truncate(start + got);
            if got < step {
                break;
            }
            remaining -= got as u64;
        }
        Ok(out)
    }
}

impl<S: ForwardStream + ?Sized> ForwardStream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        (**self).skip(n)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}

impl<S: ForwardStream + ?Sized> ForwardStream for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        (**self).skip(n)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}

/// [`ForwardStream`] over bytes already in memory.
///
/// # Examples
///
/// ```
/// use payload_core::io::{ForwardStream, MemoryStream};
///
/// let mut stream = MemoryStream::new(b"headerpayload".to_vec());
/// let mut head = [0u8; 6];
/// assert_eq!(stream.read(&mut head)?, 6);
/// assert_eq!(&head, b"header");
/// assert_eq!(stream.skip(100)?, 7);
/// assert_eq!(stream.remaining(), 0);
/// # Ok::<(), payload_core::PayloadError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStream<T> {
    data: T,
    pos: usize,
}

impl<T: AsRef<[u8]>> MemoryStream<T> {
    /// Creates a stream positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left before the end of the stream.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.as_ref().len() - self.pos
    }
}

impl<T: AsRef<[u8]>> ForwardStream for MemoryStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = &self.data.as_ref()[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        let step = usize::try_from(n).map_or(self.remaining(), |n| n.min(self.remaining()));
        self.pos += step;
        Ok(step as u64)
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }
}
