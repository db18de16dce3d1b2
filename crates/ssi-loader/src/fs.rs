//! Filesystem loader implementation.
//!
//! Provides [`FsLoader`] for reading source files from a base directory
//! on the local filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::{LoadError, LoadOptions, Loader};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem loader.
///
/// Resolves relative paths against a base directory and reads files as
/// raw bytes before decoding with the declared encoding.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use ssi_loader::{FsLoader, LoadOptions, Loader};
///
/// let loader = FsLoader::new("site");
/// let text = loader.load(Path::new("index.html"), &LoadOptions::default())?;
/// ```
#[derive(Debug, Clone)]
pub struct FsLoader {
    /// Root directory for relative path resolution.
    base_dir: PathBuf,
}

impl FsLoader {
    /// Create a loader rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The loader's base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Loader for FsLoader {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<String, LoadError> {
        let full = self.resolve(path);
        let bytes = fs::read(&full)
            .map_err(|err| LoadError::io(err, Some(full.clone())).with_backend(BACKEND))?;
        let text = options
            .encoding
            .decode(bytes, &full)
            .map_err(|err| err.with_backend(BACKEND))?;
        tracing::debug!(path = %full.display(), bytes = text.len(), "loaded source file");
        Ok(text)
    }
}
