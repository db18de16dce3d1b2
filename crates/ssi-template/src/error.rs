//! Parse-time and render-time error types.

use std::io;

/// Error raised while parsing a document into a node stream.
///
/// Every variant is fatal to the parse call: no partial node stream is
/// ever returned. Variants carry the offending token text so error
/// messages can point at the exact input that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The lexer hit input matching no recognized token form.
    #[error("illegal token {text:?} in directive")]
    IllegalToken {
        /// The unrecognized input.
        text: String,
    },
    /// An `=` that does not follow a parameter key.
    #[error("assignment {text:?} without a preceding parameter key")]
    MalformedAssignment {
        /// The assignment token text.
        text: String,
    },
    /// A quoted value with no pending parameter key to attach to.
    #[error("string {text:?} without a preceding parameter key")]
    MalformedString {
        /// The unquoted string content.
        text: String,
    },
    /// A parameter key that never received a value.
    #[error("parameter {key:?} is missing a value")]
    IncompleteDirective {
        /// The dangling key name.
        key: String,
    },
    /// The delimiter pair produced an unusable scan pattern.
    #[error("invalid delimiter pattern: {0}")]
    Pattern(String),
    /// The scanner failed to advance. This indicates a defect in the
    /// scanner itself, never a property of the input.
    #[error("scanner made no progress at byte {offset}")]
    Internal {
        /// Byte offset where the scan stalled.
        offset: usize,
    },
}

impl From<regex::Error> for ParseError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

/// Error raised while invoking a compiled template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A command node named a tag absent from the registry.
    #[error("unknown command {name:?} at byte {position}")]
    UnknownCommand {
        /// The unresolved command name.
        name: String,
        /// Byte offset of the directive in the original document.
        position: usize,
    },
    /// Recursive expansion exceeded the configured depth limit.
    #[error("include depth limit ({limit}) exceeded")]
    IncludeDepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },
    /// A registered tag failed.
    #[error("command {name:?} failed: {source}")]
    Tag {
        /// Name of the failing tag.
        name: String,
        /// The underlying tag error.
        #[source]
        source: TagError,
    },
    /// Source text returned by a tag failed to parse.
    #[error("included content failed to parse: {0}")]
    Include(#[from] ParseError),
}

/// Error raised by an individual tag implementation.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// A required parameter was not supplied.
    #[error("missing required parameter {0:?}")]
    MissingParameter(&'static str),
    /// A path parameter attempted to escape the base directory.
    #[error("path {0:?} escapes the base directory")]
    PathOutsideBase(String),
    /// File access failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Any other tag-specific failure.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages_name_the_offender() {
        let err = ParseError::IllegalToken {
            text: "@".to_owned(),
        };
        assert!(err.to_string().contains("\"@\""));

        let err = ParseError::IncompleteDirective {
            key: "file".to_owned(),
        };
        assert!(err.to_string().contains("\"file\""));
    }

    #[test]
    fn test_unknown_command_names_command_and_position() {
        let err = RenderError::UnknownCommand {
            name: "mystery".to_owned(),
            position: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("mystery"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_tag_error_is_render_error_source() {
        let err = RenderError::Tag {
            name: "include".to_owned(),
            source: TagError::MissingParameter("file"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
