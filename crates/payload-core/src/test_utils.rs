//! Test utilities for building payloads in memory.
//!
//! [`EntryBuilder`] encodes inner archive entries and [`PbzxBuilder`] wraps
//! bytes in the outer chunked container, so tests never need binary
//! fixtures on disk.
//!
//! # Panics
//!
//! Functions in this module may panic on encoder errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Write;

use xz2::write::XzEncoder;

use crate::formats::pbzx::PBZX_MAGIC;
use crate::types::ENTRY_MARKER;
use crate::types::EntryKind;

/// Maximum chunk size written by [`PbzxBuilder`] unless overridden.
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 0x0100_0000;

/// Builder for one encoded inner archive entry.
///
/// # Examples
///
/// ```
/// use payload_core::test_utils::EntryBuilder;
///
/// let bytes = EntryBuilder::file("x.txt", b"abcd").mode(0o100_644).encode();
/// assert_eq!(bytes.len(), 30 + 5 + 4);
/// assert_eq!(bytes[0], 0x10);
/// ```
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    marker: u8,
    kind: u8,
    mtime: u64,
    flags: u32,
    uid: i16,
    gid: i16,
    mode: u16,
    name: Vec<u8>,
    payload: Vec<u8>,
}

impl EntryBuilder {
    /// Creates an entry of raw kind `kind` with an empty payload.
    #[must_use]
    pub fn new(kind: u8, name: &str) -> Self {
        Self {
            marker: ENTRY_MARKER,
            kind,
            mtime: 0,
            flags: 0,
            uid: 0,
            gid: 0,
            mode: 0,
            name: name.as_bytes().to_vec(),
            payload: Vec::new(),
        }
    }

    /// Regular file with the given contents and mode `0o100644`.
    #[must_use]
    pub fn file(name: &str, contents: &[u8]) -> Self {
        Self::new(EntryKind::RAW_FILE, name)
            .mode(0o100_644)
            .payload(contents.to_vec())
    }

    /// Directory with mode `0o040755`.
    #[must_use]
    pub fn directory(name: &str) -> Self {
        Self::new(EntryKind::RAW_DIRECTORY, name).mode(0o040_755)
    }

    /// Symlink whose payload is `target`.
    #[must_use]
    pub fn symlink(name: &str, target: &str) -> Self {
        Self::new(EntryKind::RAW_SYMLINK, name)
            .mode(0o120_755)
            .payload(target.as_bytes().to_vec())
    }

    /// Sets the reserved marker byte.
    #[must_use]
    pub const fn marker(mut self, marker: u8) -> Self {
        self.marker = marker;
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub const fn mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }

    /// Sets the attribute flags.
    #[must_use]
    pub const fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the owner id.
    #[must_use]
    pub const fn uid(mut self, uid: i16) -> Self {
        self.uid = uid;
        self
    }

    /// Sets the group id.
    #[must_use]
    pub const fn gid(mut self, gid: i16) -> Self {
        self.gid = gid;
        self
    }

    /// Sets the mode bits.
    #[must_use]
    pub const fn mode(mut self, mode: u16) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the name with arbitrary bytes.
    #[must_use]
    pub fn raw_name(mut self, name: Vec<u8>) -> Self {
        self.name = name;
        self
    }

    /// Replaces the payload; the size field follows its length.
    #[must_use]
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Encodes header, name and payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let name_len = u16::try_from(self.name.len()).unwrap();
        let mut out = Vec::with_capacity(30 + self.name.len() + self.payload.len());
        out.push(self.marker);
        out.push(self.kind);
        out.extend_from_slice(&(self.payload.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.mtime.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&name_len.to_be_bytes());
        out.extend_from_slice(&self.uid.to_be_bytes());
        out.extend_from_slice(&self.gid.to_be_bytes());
        out.extend_from_slice(&self.mode.to_be_bytes());
        out.extend_from_slice(&self.name);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Concatenates encoded entries into one inner archive.
#[must_use]
pub fn encode_entries(entries: &[EntryBuilder]) -> Vec<u8> {
    entries.iter().flat_map(EntryBuilder::encode).collect()
}

/// Compresses `data` as one complete `.xz` stream.
#[must_use]
pub fn xz_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = XzEncoder::new(Vec::new(), 1);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builder for an outer pbzx container.
///
/// # Examples
///
/// ```
/// use payload_core::test_utils::PbzxBuilder;
///
/// let data = PbzxBuilder::new()
///     .xz_chunk(b"hello ")
///     .stored_chunk(b"world")
///     .build();
/// assert_eq!(&data[..4], b"pbzx");
/// ```
#[derive(Debug, Clone)]
pub struct PbzxBuilder {
    max_chunk_size: u64,
    body: Vec<u8>,
}

impl PbzxBuilder {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            body: Vec::new(),
        }
    }

    /// Sets the maximum chunk size written to the container header.
    #[must_use]
    pub const fn max_chunk_size(mut self, size: u64) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Appends an xz-compressed chunk holding `data`.
    #[must_use]
    pub fn xz_chunk(self, data: &[u8]) -> Self {
        let compressed = xz_compress(data);
        self.raw_chunk(data.len() as u64, compressed.len() as u64, &compressed)
    }

    /// Appends `data` as a stored chunk.
    ///
    /// `data` must not itself start with the xz magic.
    #[must_use]
    pub fn stored_chunk(self, data: &[u8]) -> Self {
        self.raw_chunk(data.len() as u64, data.len() as u64, data)
    }

    /// Splits `data` into xz chunks of at most `chunk_len` bytes each.
    #[must_use]
    pub fn split_xz(self, data: &[u8], chunk_len: usize) -> Self {
        data.chunks(chunk_len.max(1))
            .fold(self, |builder, piece| builder.xz_chunk(piece))
    }

    /// Appends a chunk with arbitrary header fields.
    #[must_use]
    pub fn raw_chunk(mut self, uncompressed_size: u64, compressed_size: u64, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(&uncompressed_size.to_be_bytes());
        self.body.extend_from_slice(&compressed_size.to_be_bytes());
        self.body.extend_from_slice(bytes);
        self
    }

    /// Returns the encoded container.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.body.len());
        out.extend_from_slice(&PBZX_MAGIC);
        out.extend_from_slice(&self.max_chunk_size.to_be_bytes());
        out.extend(self.body);
        out
    }
}

impl Default for PbzxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes `entries` and wraps them in xz chunks of `chunk_len` bytes.
#[must_use]
pub fn build_payload(entries: &[EntryBuilder], chunk_len: usize) -> Vec<u8> {
    PbzxBuilder::new()
        .split_xz(&encode_entries(entries), chunk_len)
        .build()
}
