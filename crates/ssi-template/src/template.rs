//! Template compilation and rendering.
//!
//! A [`CompiledTemplate`] binds a parsed [`NodeStream`] to its
//! compile-time options. Rendering interprets the stream directly:
//! literal nodes append their text, command nodes dispatch into the tag
//! registry supplied at invocation time. No executable code is generated
//! from document text, so literal content needs no escaping and cannot
//! inject behavior.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::RenderError;
use crate::node::{Node, NodeStream};
use crate::parser::{Delimiters, DirectiveParser};
use crate::tag::{RenderContext, TagOutput, TagRegistry};

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// What to do when a command names no registered tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTagPolicy {
    /// Fail the render with [`RenderError::UnknownCommand`].
    #[default]
    Error,
    /// Skip the command, contributing nothing to the output.
    Ignore,
}

/// Compile-time options for a template.
pub struct TemplateOptions {
    /// Base directory for resolving relative paths (e.g. for `include`).
    pub base_dir: PathBuf,
    /// Path of the source document, when known. Used in diagnostics.
    pub source_path: Option<PathBuf>,
    /// Callback to read files referenced by tags.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Arc<ReadFileFn>>,
    /// Maximum recursive expansion depth for tag output.
    ///
    /// Default: 10
    pub max_include_depth: usize,
    /// Behavior for commands with no registered tag.
    pub missing_tag: MissingTagPolicy,
    /// Delimiter pair used when expanding tag output recursively.
    pub delimiters: Delimiters,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_include_depth: 10,
            missing_tag: MissingTagPolicy::default(),
            delimiters: Delimiters::default(),
        }
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the source document path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Some(Arc::new(read_file));
        self
    }

    /// Set the maximum recursive expansion depth.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set the missing-tag policy.
    #[must_use]
    pub fn with_missing_tag(mut self, policy: MissingTagPolicy) -> Self {
        self.missing_tag = policy;
        self
    }

    /// Set the delimiter pair used for recursive expansion.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }
}

/// Default file reading function.
fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Compile a node stream into an executable template.
///
/// Compilation validates the delimiter pair (needed for recursive
/// expansion at render time); the node stream itself is taken as-is.
pub fn compile(
    nodes: NodeStream,
    options: TemplateOptions,
) -> Result<CompiledTemplate, crate::error::ParseError> {
    let parser = DirectiveParser::new(&options.delimiters)?;
    Ok(CompiledTemplate {
        nodes,
        options,
        parser,
    })
}

/// An executable template bound to a node stream.
///
/// Rendering is read-only over the stream: every invocation allocates
/// its own output buffer and context, so one template may be rendered
/// concurrently from multiple threads with independent locals.
pub struct CompiledTemplate {
    nodes: NodeStream,
    options: TemplateOptions,
    parser: DirectiveParser,
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("nodes", &self.nodes)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl CompiledTemplate {
    /// The node stream this template was compiled from.
    #[must_use]
    pub fn nodes(&self) -> &NodeStream {
        &self.nodes
    }

    /// Render with the given registry and locals.
    pub fn render(
        &self,
        registry: &TagRegistry,
        locals: HashMap<String, String>,
    ) -> Result<String, RenderError> {
        let mut ctx = RenderContext {
            locals,
            base_dir: &self.options.base_dir,
            source_path: self.options.source_path.as_deref(),
            read_file: self.options.read_file.as_ref().map_or_else(
                || &default_read_file as &ReadFileFn,
                |f| f.as_ref(),
            ),
        };
        self.render_nodes(&self.nodes, registry, &mut ctx, 0)
    }

    fn render_nodes(
        &self,
        nodes: &NodeStream,
        registry: &TagRegistry,
        ctx: &mut RenderContext<'_>,
        depth: usize,
    ) -> Result<String, RenderError> {
        if depth > self.options.max_include_depth {
            return Err(RenderError::IncludeDepthExceeded {
                limit: self.options.max_include_depth,
            });
        }

        let mut output = String::new();
        for node in nodes {
            match node {
                Node::Literal { text } => output.push_str(text),
                Node::Command {
                    name,
                    parameters,
                    span,
                } => {
                    let Some(tag) = registry.lookup(name) else {
                        match self.options.missing_tag {
                            MissingTagPolicy::Error => {
                                return Err(RenderError::UnknownCommand {
                                    name: name.clone(),
                                    position: span.start,
                                });
                            }
                            MissingTagPolicy::Ignore => continue,
                        }
                    };

                    let result =
                        tag.invoke(parameters, ctx)
                            .map_err(|source| RenderError::Tag {
                                name: name.clone(),
                                source,
                            })?;
                    match result {
                        TagOutput::Text(text) => output.push_str(&text),
                        TagOutput::Source(source) => {
                            let nested = self.parser.parse(&source)?;
                            output.push_str(&self.render_nodes(
                                &nested, registry, ctx, depth + 1,
                            )?);
                        }
                    }
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagError;
    use crate::node::Parameters;
    use crate::tag::Tag;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> NodeStream {
        DirectiveParser::new(&Delimiters::default())
            .unwrap()
            .parse(source)
            .unwrap()
    }

    fn locals(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    struct ShoutTag;

    impl Tag for ShoutTag {
        fn name(&self) -> &str {
            "shout"
        }

        fn invoke(
            &self,
            parameters: &Parameters,
            _ctx: &mut RenderContext<'_>,
        ) -> Result<TagOutput, TagError> {
            let value = parameters
                .get("value")
                .ok_or(TagError::MissingParameter("value"))?;
            Ok(TagOutput::text(value.to_uppercase()))
        }
    }

    #[test]
    fn test_literal_only_render_reproduces_input() {
        let source = "plain text, no directives\n";
        let template = compile(parse(source), TemplateOptions::default()).unwrap();
        let output = template.render(&TagRegistry::new(), HashMap::new()).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_command_output_substituted_in_place() {
        let template = compile(
            parse(r#"say <!--#shout value="hello"-->!"#),
            TemplateOptions::default(),
        )
        .unwrap();
        let registry = TagRegistry::new().with_tag(ShoutTag);

        let output = template.render(&registry, HashMap::new()).unwrap();
        assert_eq!(output, "say HELLO!");
    }

    #[test]
    fn test_unknown_command_raises_with_name_and_position() {
        let source = r#"head <!--#mystery x="1"-->"#;
        let template = compile(parse(source), TemplateOptions::default()).unwrap();

        let err = template
            .render(&TagRegistry::new(), HashMap::new())
            .unwrap_err();
        let RenderError::UnknownCommand { name, position } = err else {
            panic!("expected UnknownCommand, got {err:?}");
        };
        assert_eq!(name, "mystery");
        assert_eq!(position, 5);
    }

    #[test]
    fn test_unknown_command_ignored_under_lenient_policy() {
        let template = compile(
            parse(r#"a<!--#mystery x="1"-->b"#),
            TemplateOptions::new().with_missing_tag(MissingTagPolicy::Ignore),
        )
        .unwrap();

        let output = template.render(&TagRegistry::new(), HashMap::new()).unwrap();
        assert_eq!(output, "ab");
    }

    #[test]
    fn test_tag_failure_names_the_command() {
        let template = compile(parse(r#"<!--#shout-->"#), TemplateOptions::default()).unwrap();
        let registry = TagRegistry::new().with_tag(ShoutTag);

        let err = template.render(&registry, HashMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::Tag { ref name, .. } if name == "shout"));
    }

    #[test]
    fn test_recursive_expansion() {
        /// Tag whose output contains a further directive.
        struct NestedTag;
        impl Tag for NestedTag {
            fn name(&self) -> &str {
                "nested"
            }
            fn invoke(
                &self,
                _parameters: &Parameters,
                _ctx: &mut RenderContext<'_>,
            ) -> Result<TagOutput, TagError> {
                Ok(TagOutput::source(r#"[<!--#shout value="deep"-->]"#))
            }
        }

        let template = compile(parse("<!--#nested x=\"y\"-->"), TemplateOptions::default())
            .unwrap();
        let registry = TagRegistry::new().with_tag(ShoutTag).with_tag(NestedTag);

        let output = template.render(&registry, HashMap::new()).unwrap();
        assert_eq!(output, "[DEEP]");
    }

    #[test]
    fn test_expansion_depth_limit() {
        /// Tag whose output includes itself.
        struct LoopTag;
        impl Tag for LoopTag {
            fn name(&self) -> &str {
                "loop"
            }
            fn invoke(
                &self,
                _parameters: &Parameters,
                _ctx: &mut RenderContext<'_>,
            ) -> Result<TagOutput, TagError> {
                Ok(TagOutput::source("<!--#loop x=\"y\"-->".to_owned()))
            }
        }

        let template = compile(
            parse(r#"<!--#loop x="y"-->"#),
            TemplateOptions::new().with_max_include_depth(3),
        )
        .unwrap();
        let registry = TagRegistry::new().with_tag(LoopTag);

        let err = template.render(&registry, HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::IncludeDepthExceeded { limit: 3 }
        ));
    }

    #[test]
    fn test_repeated_renders_are_identical() {
        let nodes = parse(r#"x=<!--#shout value="x"-->"#);
        let template = compile(nodes, TemplateOptions::default()).unwrap();
        let registry = TagRegistry::new().with_tag(ShoutTag);

        let first = template.render(&registry, HashMap::new()).unwrap();
        let second = template.render(&registry, HashMap::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_templates_from_one_parse_agree() {
        let nodes = parse(r#"x=<!--#shout value="x"-->"#);
        let registry = TagRegistry::new().with_tag(ShoutTag);

        let first = compile(nodes.clone(), TemplateOptions::default()).unwrap();
        let second = compile(nodes, TemplateOptions::default()).unwrap();
        assert_eq!(
            first.render(&registry, HashMap::new()).unwrap(),
            second.render(&registry, HashMap::new()).unwrap()
        );
    }

    #[test]
    fn test_concurrent_renders_do_not_interleave() {
        struct WhoTag;
        impl Tag for WhoTag {
            fn name(&self) -> &str {
                "who"
            }
            fn invoke(
                &self,
                _parameters: &Parameters,
                ctx: &mut RenderContext<'_>,
            ) -> Result<TagOutput, TagError> {
                Ok(TagOutput::text(ctx.local("who").unwrap_or("nobody")))
            }
        }

        let template = compile(
            parse("<!--#who--> and <!--#who-->"),
            TemplateOptions::default(),
        )
        .unwrap();
        let registry = TagRegistry::new().with_tag(WhoTag);

        std::thread::scope(|scope| {
            let handles: Vec<_> = ["alice", "bob"]
                .into_iter()
                .map(|who| {
                    let template = &template;
                    let registry = &registry;
                    scope.spawn(move || {
                        template
                            .render(registry, locals(&[("who", who)]))
                            .unwrap()
                    })
                })
                .collect();
            let results: Vec<String> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(results, vec!["alice and alice", "bob and bob"]);
        });
    }

    #[test]
    fn test_options_builder() {
        let options = TemplateOptions::new()
            .with_base_dir("/site")
            .with_source_path("/site/index.html")
            .with_max_include_depth(5)
            .with_missing_tag(MissingTagPolicy::Ignore);

        assert_eq!(options.base_dir, PathBuf::from("/site"));
        assert_eq!(
            options.source_path,
            Some(PathBuf::from("/site/index.html"))
        );
        assert_eq!(options.max_include_depth, 5);
        assert_eq!(options.missing_tag, MissingTagPolicy::Ignore);
    }
}
