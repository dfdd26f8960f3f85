//! The outer pbzx container: a chunked, independently compressed stream.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "pbzx"
//! 4       8     maximum chunk size (big-endian, informational)
//! 12..    8+8+N per chunk: uncompressed size, compressed size, N bytes
//! ```
//!
//! Chunks follow each other until the input ends. [`ChunkedStream`] decodes
//! them one at a time and hands out their bytes as one forward-only stream,
//! so at most one decoded chunk is resident at any moment.

use std::io;
use std::io::Read;

use log::debug;

use super::compression::decode_chunk;
use crate::PayloadError;
use crate::Result;
use crate::io::ForwardStream;

/// Magic tag opening every pbzx container.
pub const PBZX_MAGIC: [u8; 4] = *b"pbzx";

/// Length of the container header (magic + maximum chunk size).
pub const STREAM_HEADER_LEN: usize = 12;

/// Length of each chunk header (two big-endian u64 sizes).
pub const CHUNK_HEADER_LEN: usize = 16;

/// Size fields preceding every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Declared size after decompression.
    pub uncompressed_size: u64,
    /// Number of encoded bytes that follow the header.
    pub compressed_size: u64,
}

impl ChunkHeader {
    /// Decodes a chunk header from its 16 big-endian bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; CHUNK_HEADER_LEN]) -> Self {
        let (uncompressed, compressed) = bytes.split_at(8);
        Self {
            uncompressed_size: u64::from_be_bytes(to_array(uncompressed)),
            compressed_size: u64::from_be_bytes(to_array(compressed)),
        }
    }
}

/// Forward-only byte stream over the decoded chunks of a pbzx container.
///
/// Chunk boundaries are invisible to callers: a single [`read`] or [`skip`]
/// may span any number of chunks. A decoded chunk is dropped as soon as its
/// last byte has been consumed.
///
/// [`read`]: ForwardStream::read
/// [`skip`]: ForwardStream::skip
///
/// # Examples
///
/// ```no_run
/// use payload_core::formats::pbzx::ChunkedStream;
/// use payload_core::io::ForwardStream;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut stream = ChunkedStream::new(File::open("payload")?)?;
/// let mut header = [0u8; 30];
/// let n = stream.read(&mut header)?;
/// println!("read {n} bytes, max chunk {}", stream.max_chunk_size());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChunkedStream<R> {
    reader: R,
    max_chunk_size: u64,
    buffer: Vec<u8>,
    offset: usize,
    position: u64,
    chunks_decoded: u64,
    finished: bool,
}

impl<R: Read> ChunkedStream<R> {
    /// Reads and validates the container header.
    ///
    /// No chunk is decoded until the first read or skip.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Format`] if the header is truncated or the
    /// magic tag is wrong, and [`PayloadError::Io`] if reading fails.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = [0u8; STREAM_HEADER_LEN];
        let got = read_full(&mut reader, &mut header)?;
        if got < STREAM_HEADER_LEN {
            return Err(PayloadError::format(format!(
                "truncated pbzx header: got {got} of {STREAM_HEADER_LEN} bytes"
            )));
        }

        let (magic, max_chunk) = header.split_at(PBZX_MAGIC.len());
        if magic != PBZX_MAGIC {
            return Err(PayloadError::format("not a pbzx payload (bad magic)"));
        }
        let max_chunk_size = u64::from_be_bytes(to_array(max_chunk));
        debug!("pbzx container, maximum chunk size {max_chunk_size}");

        Ok(Self {
            reader,
            max_chunk_size,
            buffer: Vec::new(),
            offset: 0,
            position: 0,
            chunks_decoded: 0,
            finished: false,
        })
    }

    /// Maximum chunk size declared in the container header.
    ///
    /// Informational only; chunk sizes are not checked against it.
    #[must_use]
    pub const fn max_chunk_size(&self) -> u64 {
        self.max_chunk_size
    }

    /// Number of chunks decoded so far.
    #[must_use]
    pub const fn chunks_decoded(&self) -> u64 {
        self.chunks_decoded
    }

    /// Reads and decodes the next chunk.
    ///
    /// Returns `Ok(None)` once the input ends cleanly at a chunk boundary.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Format`] for a truncated chunk header or
    /// payload, and [`PayloadError::Decompression`] if the codec rejects the
    /// chunk.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let mut raw_header = [0u8; CHUNK_HEADER_LEN];
        let got = read_full(&mut self.reader, &mut raw_header)?;
        if got == 0 {
            self.finished = true;
            return Ok(None);
        }
        if got < CHUNK_HEADER_LEN {
            return Err(PayloadError::format(format!(
                "truncated header for chunk {}: got {got} of {CHUNK_HEADER_LEN} bytes",
                self.chunks_decoded
            )));
        }
        let header = ChunkHeader::from_bytes(&raw_header);

        let mut data = Vec::new();
        (&mut self.reader)
            .take(header.compressed_size)
            .read_to_end(&mut data)?;
        if (data.len() as u64) < header.compressed_size {
            return Err(PayloadError::format(format!(
                "truncated chunk {}: expected {} compressed bytes, got {}",
                self.chunks_decoded,
                header.compressed_size,
                data.len()
            )));
        }

        let index = self.chunks_decoded;
        let (encoding, decoded) = decode_chunk(header.uncompressed_size, data)
            .map_err(|source| PayloadError::Decompression { chunk: index, source })?;
        if decoded.len() as u64 != header.uncompressed_size {
            debug!(
                "chunk {index} declared {} bytes but decoded to {}",
                header.uncompressed_size,
                decoded.len()
            );
        }
        debug!(
            "decoded chunk {index} ({}): {} -> {} bytes",
            encoding.name(),
            header.compressed_size,
            decoded.len()
        );

        self.chunks_decoded += 1;
        Ok(Some(decoded))
    }

    /// Makes sure the current buffer has unread bytes, decoding further
    /// chunks as needed. Returns `false` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        while self.offset == self.buffer.len() {
            match self.next_chunk()? {
                Some(chunk) => {
                    self.buffer = chunk;
                    self.offset = 0;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Advances within the current buffer and drops it once fully consumed.
    fn consume(&mut self, n: usize) {
        self.offset += n;
        self.position += n as u64;
        if self.offset == self.buffer.len() {
            self.buffer = Vec::new();
            self.offset = 0;
        }
    }
}

impl<R: Read> ForwardStream for ChunkedStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            if !self.fill()? {
                break;
            }
            let available = &self.buffer[self.offset..];
            let n = available.len().min(buf.len() - total);
            buf[total..total + n].copy_from_slice(&available[..n]);
            self.consume(n);
            total += n;
        }
        Ok(total)
    }

    fn skip(&mut self, n: u64) -> Result<u64> {
        let mut skipped = 0u64;
        while skipped < n {
            if !self.fill()? {
                break;
            }
            let available = self.buffer.len() - self.offset;
            let step = usize::try_from(n - skipped).map_or(available, |want| want.min(available));
            self.consume(step);
            skipped += step as u64;
        }
        Ok(skipped)
    }

    fn position(&self) -> u64 {
        self.position
    }
}

/// Reads until `buf` is full or the input ends, returning the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
