//! The `set` tag.

use crate::error::TagError;
use crate::node::Parameters;
use crate::tag::{RenderContext, Tag, TagOutput};

/// Binds a local variable for the remainder of the render.
///
/// `<!--#set var="title" value="Home"-->` emits nothing; a later
/// `<!--#echo var="title"-->` sees the new value. The binding lives in
/// the per-render context, so it never leaks across render calls.
pub struct SetTag;

impl Tag for SetTag {
    fn name(&self) -> &str {
        "set"
    }

    fn invoke(
        &self,
        parameters: &Parameters,
        ctx: &mut RenderContext<'_>,
    ) -> Result<TagOutput, TagError> {
        let var = parameters
            .get("var")
            .ok_or(TagError::MissingParameter("var"))?;
        let value = parameters
            .get("value")
            .ok_or(TagError::MissingParameter("value"))?;

        ctx.set_local(var, value);
        Ok(TagOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    fn read_nothing(_: &Path) -> io::Result<String> {
        Ok(String::new())
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_set_binds_local_and_emits_nothing() {
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("."),
            source_path: None,
            read_file: &read_nothing,
        };

        let output = SetTag
            .invoke(&params(&[("var", "title"), ("value", "Home")]), &mut ctx)
            .unwrap();

        assert_eq!(output, TagOutput::empty());
        assert_eq!(ctx.local("title"), Some("Home"));
    }

    #[test]
    fn test_set_overwrites_existing_local() {
        let mut ctx = RenderContext {
            locals: HashMap::from([("title".to_owned(), "Old".to_owned())]),
            base_dir: Path::new("."),
            source_path: None,
            read_file: &read_nothing,
        };

        SetTag
            .invoke(&params(&[("var", "title"), ("value", "New")]), &mut ctx)
            .unwrap();
        assert_eq!(ctx.local("title"), Some("New"));
    }

    #[test]
    fn test_set_requires_both_parameters() {
        let mut ctx = RenderContext {
            locals: HashMap::new(),
            base_dir: Path::new("."),
            source_path: None,
            read_file: &read_nothing,
        };

        let err = SetTag
            .invoke(&params(&[("var", "title")]), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TagError::MissingParameter("value")));

        let err = SetTag
            .invoke(&params(&[("value", "Home")]), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TagError::MissingParameter("var")));
    }
}
