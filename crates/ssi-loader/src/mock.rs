//! Mock loader implementation for testing.
//!
//! Provides [`MockLoader`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::loader::{LoadError, LoadOptions, Loader};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock loader for testing.
///
/// Serves file content from an in-memory map. Use the builder method to
/// configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use ssi_loader::{LoadOptions, Loader, MockLoader};
///
/// let loader = MockLoader::new()
///     .with_file("index.html", "<p>hi</p>");
///
/// let text = loader.load(Path::new("index.html"), &LoadOptions::default()).unwrap();
/// assert_eq!(text, "<p>hi</p>");
/// ```
#[derive(Debug, Default)]
pub struct MockLoader {
    files: HashMap<PathBuf, String>,
}

impl MockLoader {
    /// Create an empty mock loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl Loader for MockLoader {
    fn load(&self, path: &Path, _options: &LoadOptions) -> Result<String, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::not_found(path).with_backend(BACKEND))
    }
}
