//! Directive parsing and template rendering for SSI-style documents.
//!
//! This crate implements the core pipeline: plain text containing
//! delimiter-bounded directives (`<!--#include file="a.html"-->` by
//! default) is parsed into a [`NodeStream`] of literal and command nodes,
//! then compiled into a [`CompiledTemplate`] that renders through a
//! pluggable [`TagRegistry`].
//!
//! # Architecture
//!
//! Processing happens in three stages:
//!
//! 1. **Scanning** ([`DirectiveParser`]): locates directive spans using a
//!    pattern built from the configured delimiter pair and interleaves
//!    them with the literal text around them.
//! 2. **Grammar validation**: the inner text of each directive is lexed
//!    into tokens and checked against the `command key="value" ...`
//!    grammar, producing a [`Node::Command`].
//! 3. **Rendering** ([`CompiledTemplate::render`]): literal nodes are
//!    emitted verbatim; command nodes dispatch to the [`Tag`] registered
//!    under their name. A tag may return further source text, which is
//!    expanded recursively up to a configurable depth.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use ssi_template::{compile, Delimiters, DirectiveParser, TagRegistry, TemplateOptions};
//!
//! let parser = DirectiveParser::new(&Delimiters::default()).unwrap();
//! let nodes = parser.parse(r#"Hello <!--#echo var="name"-->!"#).unwrap();
//!
//! let template = compile(nodes, TemplateOptions::default()).unwrap();
//! let registry = TagRegistry::with_builtins();
//! let locals = HashMap::from([("name".to_owned(), "world".to_owned())]);
//!
//! let output = template.render(&registry, locals).unwrap();
//! assert_eq!(output, "Hello world!");
//! ```

mod error;
mod node;
mod parser;
mod tag;
mod tags;
mod template;
mod token;

pub use error::{ParseError, RenderError, TagError};
pub use node::{Node, NodeStream, Parameters, Span};
pub use parser::{Delimiters, DirectiveParser};
pub use tag::{RenderContext, Tag, TagOutput, TagRegistry};
pub use tags::{EchoTag, IncludeTag, SetTag};
pub use template::{
    CompiledTemplate, MissingTagPolicy, ReadFileFn, TemplateOptions, compile,
};
