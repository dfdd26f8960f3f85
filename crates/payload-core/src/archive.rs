//! Payload handles and builders.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::PayloadError;
use crate::Result;
use crate::formats::ChunkedStream;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;

/// A payload file whose container header has been validated.
///
/// Opening reads only the 12-byte container header; no chunk is decoded
/// until [`Payload::extract`] or [`Payload::list`] runs.
#[derive(Debug)]
pub struct Payload {
    path: PathBuf,
    max_chunk_size: u64,
    config: ExtractionConfig,
}

impl Payload {
    /// Opens `path` and validates its container header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a pbzx
    /// payload.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = ChunkedStream::new(BufReader::new(File::open(&path)?))?;
        Ok(Self {
            path,
            max_chunk_size: stream.max_chunk_size(),
            config: ExtractionConfig::default(),
        })
    }

    /// Replaces the extraction configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the path to the payload file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum chunk size declared in the container header.
    #[must_use]
    pub const fn max_chunk_size(&self) -> u64 {
        self.max_chunk_size
    }

    /// Returns a reference to the extraction configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts the payload to the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails.
    pub fn extract<P: AsRef<Path>>(&self, output_dir: P) -> Result<ExtractionReport> {
        crate::api::extract_payload(&self.path, Some(output_dir.as_ref()), &self.config)
    }

    /// Walks the payload, reporting every entry to `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed.
    pub fn list(&self, progress: &mut dyn ProgressCallback) -> Result<ExtractionReport> {
        crate::api::list_payload(&self.path, &self.config, progress)
    }
}

/// Builder for configuring payload extraction.
///
/// # Examples
///
/// ```no_run
/// use payload_core::ExtractionBuilder;
/// use payload_core::ExtractionConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = ExtractionBuilder::new()
///     .payload("Payload")
///     .output_dir("/tmp/output")
///     .config(ExtractionConfig::strict())
///     .extract()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExtractionBuilder {
    payload_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    config: Option<ExtractionConfig>,
}

impl ExtractionBuilder {
    /// Creates a new `ExtractionBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload file path.
    #[must_use]
    pub fn payload<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.payload_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory. Without one, the payload is only walked.
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the extraction configuration.
    #[must_use]
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Executes the extraction with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload path is not set, or if extraction
    /// fails.
    pub fn extract(self) -> Result<ExtractionReport> {
        self.extract_with_progress(&mut NoopProgress)
    }

    /// Executes the extraction, reporting every entry to `progress`.
    ///
    /// # Errors
    ///
    /// Same as [`ExtractionBuilder::extract`].
    pub fn extract_with_progress(
        self,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let payload_path = self
            .payload_path
            .ok_or_else(|| PayloadError::InvalidConfiguration("payload path not set".into()))?;
        let config = self.config.unwrap_or_default();

        crate::api::extract_payload_with_progress(
            payload_path,
            self.output_dir.as_deref(),
            &config,
            progress,
        )
    }
}
