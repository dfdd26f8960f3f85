//! Single-chunk decompression for the outer pbzx layer.
//!
//! Each pbzx chunk is an independent LZMA-family stream (normally a complete
//! `.xz` stream). Chunks that did not shrink under compression are stored
//! verbatim instead; [`ChunkEncoding::detect`] tells the two apart.

use std::io;
use std::io::Read;

use xz2::read::XzDecoder;
use xz2::stream::Stream;

/// Magic bytes opening every `.xz` stream.
pub const XZ_MAGIC: [u8; 6] = [0xFD, b'7', b'z', b'X', b'Z', 0x00];

/// Upper bound on the output capacity reserved from a chunk's declared size.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// How the bytes of one outer chunk are encoded.
///
/// # Examples
///
/// ```
/// use payload_core::formats::compression::{ChunkEncoding, XZ_MAGIC};
///
/// assert_eq!(ChunkEncoding::detect(6, &XZ_MAGIC), ChunkEncoding::Xz);
/// assert_eq!(ChunkEncoding::detect(5, b"plain"), ChunkEncoding::Stored);
/// assert_eq!(ChunkEncoding::detect(100, b"plain"), ChunkEncoding::Xz);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkEncoding {
    /// LZMA-family compressed (xz or legacy lzma container).
    Xz,

    /// Stored uncompressed because compression did not help.
    Stored,
}

impl ChunkEncoding {
    /// Classifies a chunk from its declared uncompressed size and its bytes.
    ///
    /// A chunk counts as stored only when its length equals the declared
    /// uncompressed size and it does not start with the xz magic; anything
    /// else goes to the codec, which reports malformed data itself.
    #[must_use]
    pub fn detect(declared_size: u64, data: &[u8]) -> Self {
        if data.len() as u64 == declared_size && !data.starts_with(&XZ_MAGIC) {
            Self::Stored
        } else {
            Self::Xz
        }
    }

    /// Returns a human-readable name for this encoding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xz => "xz",
            Self::Stored => "stored",
        }
    }
}

/// Decompresses one complete chunk in a single shot.
///
/// `size_hint` is the chunk's declared uncompressed size; it only sizes the
/// initial allocation and is not trusted beyond [`MAX_PREALLOC`].
///
/// # Errors
///
/// Returns an `io::Error` if the data is not a valid xz/lzma stream.
pub fn decompress_chunk(data: &[u8], size_hint: u64) -> io::Result<Vec<u8>> {
    let stream = Stream::new_auto_decoder(u64::MAX, xz2::stream::CONCATENATED)
        .map_err(io::Error::other)?;
    let mut decoder = XzDecoder::new_stream(data, stream);

    let capacity = usize::try_from(size_hint.min(MAX_PREALLOC)).unwrap_or(0);
    let mut out = Vec::with_capacity(capacity);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decodes a chunk according to its detected encoding.
///
/// # Errors
///
/// Returns an `io::Error` if a compressed chunk fails to decompress.
pub fn decode_chunk(declared_size: u64, data: Vec<u8>) -> io::Result<(ChunkEncoding, Vec<u8>)> {
    match ChunkEncoding::detect(declared_size, &data) {
        ChunkEncoding::Stored => Ok((ChunkEncoding::Stored, data)),
        ChunkEncoding::Xz => {
            decompress_chunk(&data, declared_size).map(|out| (ChunkEncoding::Xz, out))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use xz2::write::XzEncoder;

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut encoder = XzEncoder::new(Vec::new(), 6);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decompress_round_trip() {
        let original = b"hello pbzx chunk".repeat(100);
        let compressed = xz(&original);
        let out = decompress_chunk(&compressed, original.len() as u64).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_decompress_ignores_bogus_size_hint() {
        let compressed = xz(b"abc");
        assert_eq!(decompress_chunk(&compressed, u64::MAX).unwrap(), b"abc");
        assert_eq!(decompress_chunk(&compressed, 0).unwrap(), b"abc");
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        let result = decompress_chunk(b"definitely not xz data", 100);
        assert!(result.is_err());
    }

    #[test]
    fn test_decompress_rejects_truncated_stream() {
        let compressed = xz(&[7u8; 4096]);
        let truncated = &compressed[..compressed.len() / 2];
        assert!(decompress_chunk(truncated, 4096).is_err());
    }

    #[test]
    fn test_detect_encoding() {
        let compressed = xz(b"abc");
        assert_eq!(ChunkEncoding::detect(3, &compressed), ChunkEncoding::Xz);
        assert_eq!(
            ChunkEncoding::detect(compressed.len() as u64, &compressed),
            ChunkEncoding::Xz
        );
        assert_eq!(ChunkEncoding::detect(3, b"abc"), ChunkEncoding::Stored);
    }

    #[test]
    fn test_decode_chunk_stored_passthrough() {
        let (encoding, out) = decode_chunk(4, b"raw!".to_vec()).unwrap();
        assert_eq!(encoding, ChunkEncoding::Stored);
        assert_eq!(out, b"raw!");
    }

    #[test]
    fn test_encoding_name() {
        assert_eq!(ChunkEncoding::Xz.name(), "xz");
        assert_eq!(ChunkEncoding::Stored.name(), "stored");
    }
}
