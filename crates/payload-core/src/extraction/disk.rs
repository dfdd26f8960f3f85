//! Materializes entries under an output directory.

use std::fs::File;
use std::fs::create_dir_all;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use log::debug;

use crate::ExtractionConfig;
use crate::PayloadError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_exact;
use crate::extraction::EntrySink;
use crate::io::ForwardStream;
use crate::report::ArchiveTally;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::types::DestDir;
use crate::types::Entry;

/// Sink that writes files and symlinks below a destination directory.
///
/// Directory entries are not created on their own; every file and link
/// gets its missing parent directories created on demand instead.
///
/// # Examples
///
/// ```
/// use payload_core::extraction::DiskSink;
/// use payload_core::formats::payload::ArchiveWalker;
/// use payload_core::io::MemoryStream;
/// use payload_core::test_utils::EntryBuilder;
/// use payload_core::{DestDir, ExtractionConfig};
///
/// let out = tempfile::tempdir()?;
/// let bytes = EntryBuilder::file("x.txt", b"abcd").encode();
///
/// let mut sink = DiskSink::new(DestDir::new(out.path())?, &ExtractionConfig::default());
/// ArchiveWalker::new(MemoryStream::new(bytes)).walk(&mut sink)?;
///
/// assert_eq!(std::fs::read(out.path().join("x.txt"))?, b"abcd");
/// assert_eq!(sink.files_written(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DiskSink<P = NoopProgress> {
    dest: DestDir,
    config: ExtractionConfig,
    buffer: CopyBuffer,
    progress: P,
    files_written: usize,
    symlinks_created: usize,
    bytes_written: u64,
}

impl DiskSink<NoopProgress> {
    /// Creates a sink writing below `dest`.
    #[must_use]
    pub fn new(dest: DestDir, config: &ExtractionConfig) -> Self {
        Self::with_progress(dest, config, NoopProgress)
    }
}

impl<P: ProgressCallback> DiskSink<P> {
    /// Creates a sink writing below `dest` that reports to `progress`.
    pub fn with_progress(dest: DestDir, config: &ExtractionConfig, progress: P) -> Self {
        Self {
            dest,
            config: config.clone(),
            buffer: CopyBuffer::with_size(config.effective_copy_buffer_size()),
            progress,
            files_written: 0,
            symlinks_created: 0,
            bytes_written: 0,
        }
    }

    /// Destination directory.
    pub fn dest(&self) -> &Path {
        self.dest.as_path()
    }

    /// Number of files written so far.
    pub const fn files_written(&self) -> usize {
        self.files_written
    }

    /// Number of symlinks created so far.
    pub const fn symlinks_created(&self) -> usize {
        self.symlinks_created
    }

    /// Total file bytes written so far.
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the sink, returning the progress callback.
    pub fn into_progress(self) -> P {
        self.progress
    }

    /// Resolves `name` below the destination and prepares its location.
    ///
    /// An existing symlink at the final path is never written through: it is
    /// removed with `overwrite` and refused otherwise.
    fn prepare(&self, name: &str) -> Result<PathBuf> {
        let path = self.dest.resolve_checked(name)?;

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        if let Ok(meta) = std::fs::symlink_metadata(&path) {
            if self.config.overwrite && !meta.is_dir() {
                std::fs::remove_file(&path)?;
            } else if meta.file_type().is_symlink() {
                return Err(PayloadError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("refusing to write through symlink {}", path.display()),
                )));
            }
        }

        Ok(path)
    }
}

impl<P: ProgressCallback> EntrySink for DiskSink<P> {
    fn store_file(
        &mut self,
        entry: &Entry,
        stream: &mut dyn ForwardStream,
        size: u64,
    ) -> Result<()> {
        let path = self.prepare(&entry.name)?;
        debug!("writing {} ({size} bytes)", path.display());

        let mut file = File::create(&path)?;
        let progress = &mut self.progress;
        let written = copy_exact(stream, &mut file, size, &mut self.buffer, |n| {
            progress.on_bytes_written(n);
        })?;
        file.flush()?;

        if self.config.preserve_mtime
            && let Some(mtime) = entry.modified()
        {
            file.set_modified(mtime)?;
        }
        drop(file);

        #[cfg(unix)]
        if self.config.preserve_permissions {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(entry.permissions());
            std::fs::set_permissions(&path, permissions)?;
        }

        self.files_written += 1;
        self.bytes_written += written;
        Ok(())
    }

    #[allow(unused_variables)]
    fn create_symlink(&mut self, entry: &Entry, target: &str) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink;

            let path = self.prepare(&entry.name)?;
            debug!("linking {} -> {target}", path.display());
            symlink(target, &path)?;
            self.symlinks_created += 1;
            Ok(())
        }

        #[cfg(not(unix))]
        {
            Err(PayloadError::UnsupportedOperation(
                "symlinks are not supported on this platform",
            ))
        }
    }

    fn entry_complete(&mut self, entry: &Entry, link_target: Option<&str>) -> Result<()> {
        self.progress.on_entry(entry, link_target);
        Ok(())
    }

    fn finish(&mut self, tally: &ArchiveTally) -> Result<()> {
        self.progress.on_complete(tally);
        Ok(())
    }
}
