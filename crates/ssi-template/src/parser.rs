//! Document-level directive parser.
//!
//! Scans a whole document for delimiter-bounded directive spans and
//! produces the [`NodeStream`] of literal text and validated commands.

use regex::Regex;

use crate::error::ParseError;
use crate::node::{Node, NodeStream, Parameters, Span};
use crate::token::{TokenKind, lex_line};

/// The marker pair bounding a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    /// Opening marker.
    pub open: String,
    /// Closing marker.
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "<!--#".to_owned(),
            close: "-->".to_owned(),
        }
    }
}

impl Delimiters {
    /// Create a delimiter pair from the two marker strings.
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Parser for one delimiter configuration.
///
/// The scan pattern is rebuilt from the configured markers, so any pair
/// of non-empty strings works. The inner directive text must be at least
/// one character and cannot span lines: a bare `<!--#-->` is literal
/// text, not a directive.
#[derive(Debug)]
pub struct DirectiveParser {
    pattern: Regex,
}

impl DirectiveParser {
    /// Build a parser for the given delimiter pair.
    pub fn new(delimiters: &Delimiters) -> Result<Self, ParseError> {
        let pattern = Regex::new(&format!(
            "{}([^\r\n]+?){}",
            regex::escape(&delimiters.open),
            regex::escape(&delimiters.close)
        ))?;
        Ok(Self { pattern })
    }

    /// Parse a document into a node stream.
    ///
    /// Parsing is all-or-nothing: the first grammar violation aborts the
    /// whole call and no partial stream is returned.
    pub fn parse(&self, source: &str) -> Result<NodeStream, ParseError> {
        let mut nodes = Vec::new();
        let mut cursor = 0;

        for caps in self.pattern.captures_iter(source) {
            let matched = caps.get(0).expect("capture group 0 always exists");
            let inner = caps.get(1).expect("scan pattern has one capture group");

            if matched.end() <= cursor {
                // The iterator must advance strictly past each match.
                return Err(ParseError::Internal { offset: cursor });
            }

            if matched.start() > cursor {
                nodes.push(Node::Literal {
                    text: source[cursor..matched.start()].to_owned(),
                });
            }

            if let Some((name, parameters)) = parse_directive(inner.as_str().trim())? {
                nodes.push(Node::Command {
                    name,
                    parameters,
                    span: Span {
                        start: matched.start(),
                        end: matched.end(),
                    },
                });
            }

            cursor = matched.end();
        }

        if cursor < source.len() || nodes.is_empty() {
            nodes.push(Node::Literal {
                text: source[cursor..].to_owned(),
            });
        }

        Ok(NodeStream::from_nodes(nodes))
    }
}

/// Validate one directive's inner text against the command grammar.
///
/// Returns `None` for a directive that lexes to zero meaningful tokens:
/// such a span is consumed as a no-op rather than treated as an error.
fn parse_directive(inner: &str) -> Result<Option<(String, Parameters)>, ParseError> {
    let tokens = lex_line(inner)?;

    let mut name = None;
    let mut parameters = Parameters::new();
    let mut pending_key: Option<String> = None;
    let mut prev: Option<TokenKind> = None;

    for token in tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
    {
        let kind = token.kind;
        match kind {
            TokenKind::Identifier => {
                if prev.is_none() {
                    name = Some(token.text);
                } else {
                    // A later identifier replaces an unassigned pending
                    // key; only a trailing unassigned key is an error.
                    pending_key = Some(token.text);
                }
            }
            TokenKind::Assignment => {
                if prev != Some(TokenKind::Identifier) || pending_key.is_none() {
                    return Err(ParseError::MalformedAssignment { text: token.text });
                }
            }
            TokenKind::StringLiteral => match pending_key.take() {
                Some(key) => parameters.insert(key, token.text),
                None => return Err(ParseError::MalformedString { text: token.text }),
            },
            // Filtered out above.
            TokenKind::Whitespace => {}
        }
        prev = Some(kind);
    }

    if let Some(key) = pending_key {
        return Err(ParseError::IncompleteDirective { key });
    }

    Ok(name.map(|n| (n, parameters)))
}
