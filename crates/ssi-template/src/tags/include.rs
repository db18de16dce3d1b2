//! The `include` tag.

use std::io;

use crate::error::TagError;
use crate::node::Parameters;
use crate::tag::{RenderContext, Tag, TagOutput};

/// Splices another file into the output.
///
/// `<!--#include file="partials/header.html"-->` resolves the path under
/// the base directory and expands the file's content recursively, so
/// included files may themselves contain directives. `virtual="…"` is
/// accepted as an alias for `file="…"`.
///
/// Paths that are absolute or contain `..` components are rejected: an
/// include can never read outside the base directory.
pub struct IncludeTag;

impl Tag for IncludeTag {
    fn name(&self) -> &str {
        "include"
    }

    fn invoke(
        &self,
        parameters: &Parameters,
        ctx: &mut RenderContext<'_>,
    ) -> Result<TagOutput, TagError> {
        let relative = parameters
            .get("file")
            .or_else(|| parameters.get("virtual"))
            .ok_or(TagError::MissingParameter("file"))?;

        let Some(path) = ctx.resolve_path_checked(relative) else {
            return Err(TagError::PathOutsideBase(relative.to_owned()));
        };

        let content = ctx.read(&path).map_err(|err| {
            TagError::Io(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            ))
        })?;
        Ok(TagOutput::source(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_include_reads_resolved_file() {
        let read = |path: &Path| -> io::Result<String> {
            assert_eq!(path, Path::new("/site/header.html"));
            Ok("<header/>".to_owned())
        };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let output = IncludeTag
            .invoke(&params(&[("file", "header.html")]), &mut ctx)
            .unwrap();
        assert_eq!(output, TagOutput::source("<header/>"));
    }

    #[test]
    fn test_include_virtual_alias() {
        let read = |_: &Path| -> io::Result<String> { Ok("<nav/>".to_owned()) };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let output = IncludeTag
            .invoke(&params(&[("virtual", "nav.html")]), &mut ctx)
            .unwrap();
        assert_eq!(output, TagOutput::source("<nav/>"));
    }

    #[test]
    fn test_include_prefers_file_over_virtual() {
        let read = |path: &Path| -> io::Result<String> { Ok(path.display().to_string()) };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let output = IncludeTag
            .invoke(
                &params(&[("virtual", "b.html"), ("file", "a.html")]),
                &mut ctx,
            )
            .unwrap();
        assert_eq!(output, TagOutput::source("/site/a.html"));
    }

    #[test]
    fn test_include_without_path_parameter() {
        let read = |_: &Path| -> io::Result<String> { Ok(String::new()) };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let err = IncludeTag.invoke(&Parameters::new(), &mut ctx).unwrap_err();
        assert!(matches!(err, TagError::MissingParameter("file")));
    }

    #[test]
    fn test_include_rejects_traversal() {
        let read = |_: &Path| -> io::Result<String> { Ok("hidden".to_owned()) };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let err = IncludeTag
            .invoke(&params(&[("file", "../secret.txt")]), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TagError::PathOutsideBase(_)));
    }

    #[test]
    fn test_include_missing_file_is_io_error() {
        let read =
            |_: &Path| -> io::Result<String> { Err(io::Error::from(io::ErrorKind::NotFound)) };
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("/site"),
            source_path: None,
            read_file: &read,
        };

        let err = IncludeTag
            .invoke(&params(&[("file", "absent.html")]), &mut ctx)
            .unwrap_err();
        let TagError::Io(err) = err else {
            panic!("expected io error, got {err:?}");
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("absent.html"));
    }
}
