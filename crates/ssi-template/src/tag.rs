//! Pluggable command tags.
//!
//! A [`Tag`] is the runtime implementation behind a command name. The
//! template interpreter looks tags up in a [`TagRegistry`] at render time
//! and hands each one its parameters and a per-render [`RenderContext`].

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::TagError;
use crate::node::Parameters;
use crate::template::ReadFileFn;

/// What a tag produced for its directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutput {
    /// Final text, appended to the output as-is.
    Text(String),
    /// Source text containing further directives, expanded recursively
    /// before being appended.
    Source(String),
}

impl TagOutput {
    /// Final text output.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Source output that the interpreter expands recursively.
    #[must_use]
    pub fn source(source: impl Into<String>) -> Self {
        Self::Source(source.into())
    }

    /// Output that contributes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

/// Per-render state handed to each tag invocation.
///
/// A fresh context is created for every render call, so tags may freely
/// mutate the locals without affecting other invocations of the same
/// template.
pub struct RenderContext<'a> {
    /// Named input values, merged from defaults and per-call locals.
    /// Mutations (e.g. by a `set` tag) last for the rest of this render.
    pub locals: HashMap<String, String>,
    /// Base directory for resolving relative paths.
    pub base_dir: &'a Path,
    /// Path of the document being rendered, when known.
    pub source_path: Option<&'a Path>,
    /// Callback used to read referenced files.
    pub read_file: &'a ReadFileFn,
}

impl RenderContext<'_> {
    /// Look up a local value.
    #[must_use]
    pub fn local(&self, name: &str) -> Option<&str> {
        self.locals.get(name).map(String::as_str)
    }

    /// Bind a local value for the remainder of this render.
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.locals.insert(name.into(), value.into());
    }

    /// Resolve a relative path against the base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Resolve a relative path, rejecting attempts to leave the base
    /// directory.
    ///
    /// The check is lexical (absolute paths and `..` components are
    /// rejected), so it works regardless of whether the read callback is
    /// backed by a real filesystem.
    #[must_use]
    pub fn resolve_path_checked(&self, relative: &str) -> Option<PathBuf> {
        let requested = Path::new(relative);
        let safe = requested.components().all(|c| {
            matches!(c, Component::Normal(_) | Component::CurDir)
        });
        if safe {
            Some(self.base_dir.join(requested))
        } else {
            None
        }
    }

    /// Read a file through the context's read callback.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }
}

/// Runtime implementation of one command name.
///
/// Implementations take `&self`: a single registry may serve concurrent
/// renders, so per-render state belongs in the [`RenderContext`], not in
/// the tag.
pub trait Tag: Send + Sync {
    /// The command name this tag handles.
    fn name(&self) -> &str;

    /// Produce output for one directive occurrence.
    fn invoke(
        &self,
        parameters: &Parameters,
        ctx: &mut RenderContext<'_>,
    ) -> Result<TagOutput, TagError>;
}

/// Table mapping command names to their implementations.
///
/// # Example
///
/// ```
/// use ssi_template::{Parameters, RenderContext, Tag, TagError, TagOutput, TagRegistry};
///
/// struct UpperTag;
///
/// impl Tag for UpperTag {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn invoke(
///         &self,
///         parameters: &Parameters,
///         _ctx: &mut RenderContext<'_>,
///     ) -> Result<TagOutput, TagError> {
///         let value = parameters
///             .get("value")
///             .ok_or(TagError::MissingParameter("value"))?;
///         Ok(TagOutput::text(value.to_uppercase()))
///     }
/// }
///
/// let registry = TagRegistry::new().with_tag(UpperTag);
/// assert!(registry.lookup("upper").is_some());
/// assert!(registry.lookup("lower").is_none());
/// ```
#[derive(Default)]
pub struct TagRegistry {
    tags: Vec<Box<dyn Tag>>,
}

impl TagRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the builtin tags (`include`, `echo`,
    /// `set`) already registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with_tag(crate::tags::IncludeTag)
            .with_tag(crate::tags::EchoTag)
            .with_tag(crate::tags::SetTag)
    }

    /// Register a tag, consuming and returning the registry.
    ///
    /// A tag registered later shadows an earlier one with the same name.
    #[must_use]
    pub fn with_tag<T: Tag + 'static>(mut self, tag: T) -> Self {
        self.register(tag);
        self
    }

    /// Register a tag in place.
    pub fn register<T: Tag + 'static>(&mut self, tag: T) {
        self.tags.push(Box::new(tag));
    }

    /// Look up the implementation for a command name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&dyn Tag> {
        // Later registrations win, allowing callers to replace builtins.
        self.tags
            .iter()
            .rev()
            .find(|tag| tag.name() == name)
            .map(|tag| tag.as_ref())
    }
}
