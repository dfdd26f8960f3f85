//! Validated output directory type.

use crate::PayloadError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A validated output directory for payload extraction.
///
/// Once constructed, a `DestDir` is an existing directory represented by an
/// absolute canonical path. [`DestDir::resolve`] keeps entry names beneath it
/// lexically; [`DestDir::resolve_checked`] additionally refuses names whose
/// existing ancestors are symlinks leading out of it, which is what writers
/// must use since earlier entries may have planted such links.
///
/// # Examples
///
/// ```no_run
/// use payload_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/payload-out")?;
/// let path = dest.resolve("./System/Library/foo.plist")?;
/// assert!(path.starts_with(dest.as_path()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` for an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a directory, or
    /// cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(PayloadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("output directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(PayloadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            PayloadError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and any missing parents) if needed, then
    /// validates it like [`DestDir::new`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        Self::new(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Maps an entry name to its location beneath this directory.
    ///
    /// Leading `/` and `.` components are dropped, so `./usr/bin` and
    /// `/usr/bin` both land at `<dest>/usr/bin`. A name that resolves to the
    /// directory itself maps to the directory.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::PathTraversal`] if the name contains a `..`
    /// component or a platform path prefix.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let mut resolved = self.0.clone();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(PayloadError::PathTraversal {
                        path: PathBuf::from(name),
                    });
                }
            }
        }
        Ok(resolved)
    }

    /// Like [`DestDir::resolve`], but also follows every ancestor of the
    /// result that already exists on disk and requires each symlink among
    /// them to resolve inside this directory.
    ///
    /// The final component is not followed; callers decide what to do with
    /// an existing entry there.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::PathTraversal`] if the name is rejected by
    /// [`DestDir::resolve`], or if an ancestor is a symlink pointing outside
    /// this directory or at nothing. Other metadata failures are `Io`.
    pub fn resolve_checked(&self, name: &str) -> Result<PathBuf> {
        let resolved = self.resolve(name)?;
        let Some(parent) = resolved.parent() else {
            return Ok(resolved);
        };
        let Ok(relative) = parent.strip_prefix(&self.0) else {
            return Ok(resolved);
        };

        let mut current = self.0.clone();
        for component in relative.components() {
            current.push(component);
            match std::fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    let inside = current
                        .canonicalize()
                        .is_ok_and(|target| target.starts_with(&self.0));
                    if !inside {
                        return Err(PayloadError::PathTraversal {
                            path: PathBuf::from(name),
                        });
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(resolved)
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
