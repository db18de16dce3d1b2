//! High-level facade over the SSI pipeline.
//!
//! An [`Engine`] ties together the directive parser, the tag registry,
//! and a [`Loader`], exposing parse/compile/render operations for both
//! in-memory text and files resolved under a base directory. Errors that
//! cross this boundary are annotated with the originating source path
//! when one is known.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use ssi_engine::{Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let locals = HashMap::from([("name".to_owned(), "world".to_owned())]);
//!
//! let output = engine
//!     .render(r#"Hello <!--#echo var="name"-->!"#, locals)
//!     .unwrap();
//! assert_eq!(output, "Hello world!");
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ssi_loader::{Encoding, FsLoader, LoadError, LoadOptions, Loader};
use ssi_template::{
    CompiledTemplate, Delimiters, DirectiveParser, MissingTagPolicy, NodeStream, ParseError,
    RenderError, Tag, TagRegistry, TemplateOptions, compile,
};

/// Engine-wide configuration.
///
/// Built once per engine and only shallow-copied for per-call overrides;
/// the pipeline never mutates it.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Base directory for resolving file paths.
    pub base_dir: PathBuf,
    /// Declared text encoding of source files.
    pub encoding: Encoding,
    /// Directive delimiter pair.
    pub delimiters: Delimiters,
    /// Default locals merged into every render (per-call locals win).
    pub locals: HashMap<String, String>,
    /// Behavior for commands with no registered tag.
    pub missing_tag: MissingTagPolicy,
    /// Maximum depth for recursively expanded includes.
    pub max_include_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            encoding: Encoding::Utf8,
            delimiters: Delimiters::default(),
            locals: HashMap::new(),
            missing_tag: MissingTagPolicy::Error,
            max_include_depth: 10,
        }
    }
}

impl EngineOptions {
    /// Build engine options from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ssi_config::Config) -> Self {
        Self {
            base_dir: config.source_resolved.base_dir.clone(),
            encoding: config.source_resolved.encoding,
            delimiters: Delimiters::new(
                config.template.open_delimiter.as_str(),
                config.template.close_delimiter.as_str(),
            ),
            locals: config.locals.clone(),
            missing_tag: if config.template.strict_commands {
                MissingTagPolicy::Error
            } else {
                MissingTagPolicy::Ignore
            },
            max_include_depth: config.template.max_include_depth,
        }
    }

    /// Set the base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the delimiter pair.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Add a default local.
    #[must_use]
    pub fn with_local(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    /// Set the missing-tag policy.
    #[must_use]
    pub fn with_missing_tag(mut self, policy: MissingTagPolicy) -> Self {
        self.missing_tag = policy;
        self
    }
}

/// Facade error, annotated with the originating path when known.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The document failed to parse.
    #[error("{}{source}", origin(.path))]
    Parse {
        /// The underlying parse error.
        #[source]
        source: ParseError,
        /// Path of the document, when rendering from a file.
        path: Option<PathBuf>,
    },
    /// Rendering failed.
    #[error("{}{source}", origin(.path))]
    Render {
        /// The underlying render error.
        #[source]
        source: RenderError,
        /// Path of the document, when rendering from a file.
        path: Option<PathBuf>,
    },
    /// The source file could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Format the path prefix for error messages.
fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!("{}: ", p.display()))
        .unwrap_or_default()
}

/// The parse/compile/render facade.
///
/// Owns the engine options, the tag registry (builtins pre-registered),
/// and the loader used by the file-based entry points. A default engine
/// reads files from the configured base directory.
pub struct Engine {
    options: EngineOptions,
    registry: TagRegistry,
    loader: Arc<dyn Loader>,
}

impl Engine {
    /// Create an engine with the builtin tags and a filesystem loader
    /// rooted at the configured base directory.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        let loader = Arc::new(FsLoader::new(options.base_dir.clone()));
        Self {
            options,
            registry: TagRegistry::with_builtins(),
            loader,
        }
    }

    /// Replace the loader backing the file-based entry points.
    #[must_use]
    pub fn with_loader<L: Loader + 'static>(mut self, loader: L) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Register an additional tag, consuming and returning the engine.
    #[must_use]
    pub fn with_tag<T: Tag + 'static>(mut self, tag: T) -> Self {
        self.registry.register(tag);
        self
    }

    /// Register an additional tag in place.
    pub fn register<T: Tag + 'static>(&mut self, tag: T) {
        self.registry.register(tag);
    }

    /// The engine's options.
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The engine's tag registry.
    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Parse source text into a node stream.
    pub fn parse(&self, source: &str) -> Result<NodeStream, EngineError> {
        self.parse_annotated(source, None)
    }

    fn parse_annotated(
        &self,
        source: &str,
        path: Option<&Path>,
    ) -> Result<NodeStream, EngineError> {
        let annotate = |source: ParseError| EngineError::Parse {
            source,
            path: path.map(Path::to_path_buf),
        };
        let parser = DirectiveParser::new(&self.options.delimiters).map_err(annotate)?;
        let nodes = parser.parse(source).map_err(annotate)?;
        tracing::debug!(nodes = nodes.len(), path = ?path, "parsed document");
        Ok(nodes)
    }

    /// Load and parse a file resolved through the engine's loader.
    pub fn parse_file(&self, path: &Path) -> Result<NodeStream, EngineError> {
        let options = LoadOptions {
            encoding: self.options.encoding,
        };
        let content = self.loader.load(path, &options)?;
        self.parse_annotated(&content, Some(&self.display_path(path)))
    }

    /// Compile source text into an executable template.
    pub fn compile(&self, source: &str) -> Result<CompiledTemplate, EngineError> {
        let nodes = self.parse_annotated(source, None)?;
        compile(nodes, self.template_options(None)).map_err(|source| EngineError::Parse {
            source,
            path: None,
        })
    }

    /// Load and compile a file resolved through the engine's loader.
    pub fn compile_file(&self, path: &Path) -> Result<CompiledTemplate, EngineError> {
        let options = LoadOptions {
            encoding: self.options.encoding,
        };
        let content = self.loader.load(path, &options)?;
        let full = self.display_path(path);

        let nodes = self.parse_annotated(&content, Some(&full))?;
        compile(nodes, self.template_options(Some(full.clone()))).map_err(|source| {
            EngineError::Parse {
                source,
                path: Some(full),
            }
        })
    }

    /// Render source text with the given locals.
    ///
    /// Default locals from the engine options are merged in first, so
    /// per-call keys take precedence.
    pub fn render(
        &self,
        source: &str,
        locals: HashMap<String, String>,
    ) -> Result<String, EngineError> {
        let template = self.compile(source)?;
        template
            .render(&self.registry, self.merged_locals(locals))
            .map_err(|source| EngineError::Render { source, path: None })
    }

    /// Load, compile, and render a file with the given locals.
    pub fn render_file(
        &self,
        path: &Path,
        locals: HashMap<String, String>,
    ) -> Result<String, EngineError> {
        let template = self.compile_file(path)?;
        template
            .render(&self.registry, self.merged_locals(locals))
            .map_err(|source| EngineError::Render {
                source,
                path: Some(self.display_path(path)),
            })
    }

    /// Render a previously compiled template with the given locals.
    pub fn render_template(
        &self,
        template: &CompiledTemplate,
        locals: HashMap<String, String>,
    ) -> Result<String, EngineError> {
        template
            .render(&self.registry, self.merged_locals(locals))
            .map_err(|source| EngineError::Render { source, path: None })
    }

    fn merged_locals(&self, locals: HashMap<String, String>) -> HashMap<String, String> {
        let mut merged = self.options.locals.clone();
        merged.extend(locals);
        merged
    }

    fn template_options(&self, source_path: Option<PathBuf>) -> TemplateOptions {
        let loader = Arc::clone(&self.loader);
        let load_options = LoadOptions {
            encoding: self.options.encoding,
        };
        let mut options = TemplateOptions::new()
            .with_base_dir(&self.options.base_dir)
            .with_read_file(move |path: &Path| {
                loader.load(path, &load_options).map_err(io::Error::from)
            })
            .with_max_include_depth(self.options.max_include_depth)
            .with_missing_tag(self.options.missing_tag)
            .with_delimiters(self.options.delimiters.clone());
        if let Some(path) = source_path {
            options = options.with_source_path(path);
        }
        options
    }

    /// Path shown in diagnostics for a file-based entry point.
    fn display_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.options.base_dir.join(path)
        }
    }
}
