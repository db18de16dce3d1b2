//! Loader trait and error types.
//!
//! Provides the core [`Loader`] trait for abstracting file retrieval,
//! along with [`LoadError`] for unified error handling across backends.

use std::path::{Path, PathBuf};

/// Declared text encoding of loaded files.
///
/// Only UTF-8 is supported; the variant exists so configuration can
/// declare the encoding explicitly and reject labels nothing can decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 (labels `utf-8` and `utf8`).
    #[default]
    Utf8,
}

impl Encoding {
    /// Parse an encoding label, case-insensitively.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            _ => None,
        }
    }

    /// Canonical label for this encoding.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
        }
    }

    /// Decode raw bytes into text.
    pub(crate) fn decode(self, bytes: Vec<u8>, path: &Path) -> Result<String, LoadError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).map_err(|err| {
                LoadError::new(LoadErrorKind::InvalidData)
                    .with_path(path)
                    .with_source(err)
            }),
        }
    }
}

/// Options for one load call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Encoding used to decode the file's bytes.
    pub encoding: Encoding,
}

/// Semantic error categories for load failures.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadErrorKind {
    /// File does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path.
    InvalidPath,
    /// The file's bytes do not decode in the declared encoding.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Load error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct LoadError {
    /// Semantic error category.
    pub kind: LoadErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LoadError {
    /// Create a new load error.
    #[must_use]
    pub fn new(kind: LoadErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(LoadErrorKind::NotFound).with_path(path)
    }

    /// Create a load error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => LoadErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => LoadErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => LoadErrorKind::InvalidData,
            _ => LoadErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            LoadErrorKind::NotFound => "Not found",
            LoadErrorKind::PermissionDenied => "Permission denied",
            LoadErrorKind::InvalidPath => "Invalid path",
            LoadErrorKind::InvalidData => "Invalid data",
            LoadErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

impl From<LoadError> for std::io::Error {
    fn from(err: LoadError) -> Self {
        let kind = match err.kind {
            LoadErrorKind::NotFound => std::io::ErrorKind::NotFound,
            LoadErrorKind::PermissionDenied => std::io::ErrorKind::PermissionDenied,
            LoadErrorKind::InvalidPath | LoadErrorKind::InvalidData => {
                std::io::ErrorKind::InvalidData
            }
            LoadErrorKind::Other => std::io::ErrorKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

/// Abstraction over file retrieval.
///
/// Implementations resolve relative paths against their own root and
/// return decoded text. `Send + Sync` so one loader can serve concurrent
/// renders.
pub trait Loader: Send + Sync {
    /// Load and decode the file at `path`.
    ///
    /// Relative paths are resolved against the backend's base directory;
    /// absolute paths are used as given.
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<String, LoadError>;
}
