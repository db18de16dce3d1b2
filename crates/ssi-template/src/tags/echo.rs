//! The `echo` tag.

use crate::error::TagError;
use crate::node::Parameters;
use crate::tag::{RenderContext, Tag, TagOutput};

/// Emits the value of a local variable.
///
/// `<!--#echo var="title"-->` writes the local named `title`. When the
/// local is unset the optional `default="…"` parameter is used, falling
/// back to the empty string.
pub struct EchoTag;

impl Tag for EchoTag {
    fn name(&self) -> &str {
        "echo"
    }

    fn invoke(
        &self,
        parameters: &Parameters,
        ctx: &mut RenderContext<'_>,
    ) -> Result<TagOutput, TagError> {
        let var = parameters
            .get("var")
            .ok_or(TagError::MissingParameter("var"))?;

        let value = ctx
            .local(var)
            .or_else(|| parameters.get("default"))
            .unwrap_or_default();
        Ok(TagOutput::text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    fn read_nothing(_: &Path) -> io::Result<String> {
        Ok(String::new())
    }

    fn context(locals: &[(&str, &str)]) -> RenderContext<'static> {
        RenderContext {
            locals: locals
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            base_dir: Path::new("."),
            source_path: None,
            read_file: &read_nothing,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_echo_set_local() {
        let mut ctx = context(&[("title", "Home")]);
        let output = EchoTag.invoke(&params(&[("var", "title")]), &mut ctx).unwrap();
        assert_eq!(output, TagOutput::text("Home"));
    }

    #[test]
    fn test_echo_unset_local_is_empty() {
        let mut ctx = context(&[]);
        let output = EchoTag.invoke(&params(&[("var", "title")]), &mut ctx).unwrap();
        assert_eq!(output, TagOutput::text(""));
    }

    #[test]
    fn test_echo_unset_local_uses_default() {
        let mut ctx = context(&[]);
        let output = EchoTag
            .invoke(&params(&[("var", "title"), ("default", "Untitled")]), &mut ctx)
            .unwrap();
        assert_eq!(output, TagOutput::text("Untitled"));
    }

    #[test]
    fn test_echo_set_local_beats_default() {
        let mut ctx = context(&[("title", "Home")]);
        let output = EchoTag
            .invoke(&params(&[("var", "title"), ("default", "Untitled")]), &mut ctx)
            .unwrap();
        assert_eq!(output, TagOutput::text("Home"));
    }

    #[test]
    fn test_echo_requires_var() {
        let mut ctx = context(&[]);
        let err = EchoTag.invoke(&Parameters::new(), &mut ctx).unwrap_err();
        assert!(matches!(err, TagError::MissingParameter("var")));
    }
}
