//! Line-level lexer for directive inner text.
//!
//! Breaks the trimmed content between the delimiters of one directive
//! into a flat token sequence covering every input character.

use crate::error::ParseError;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Bare word: a command name or parameter key.
    Identifier,
    /// Double-quoted value; the token text is the unquoted content.
    StringLiteral,
    /// The `=` between a key and its value.
    Assignment,
    /// A maximal run of whitespace.
    Whitespace,
}

/// One lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// True for characters allowed in a command name or parameter key.
///
/// Same alphabet as directive names elsewhere: alphanumerics, hyphens,
/// and underscores.
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Lex the trimmed inner text of one directive.
///
/// Every character of the input belongs to exactly one token; any input
/// that matches no recognized form is a fatal [`ParseError::IllegalToken`].
pub(crate) fn lex_line(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < input.len() {
        let (token, consumed) = next_token(&input[offset..])?;
        if consumed == 0 {
            // A zero-length match would loop forever; fail loudly instead.
            return Err(ParseError::Internal { offset });
        }
        offset += consumed;
        tokens.push(token);
    }

    Ok(tokens)
}

/// Read one token from the front of `rest`.
///
/// Returns the token and the number of input bytes it covers (which can
/// differ from the token text length for quoted strings).
fn next_token(rest: &str) -> Result<(Token, usize), ParseError> {
    let first = rest
        .chars()
        .next()
        .ok_or(ParseError::Internal { offset: 0 })?;

    if first == '=' {
        let token = Token {
            kind: TokenKind::Assignment,
            text: "=".to_owned(),
        };
        return Ok((token, 1));
    }

    if first == '"' {
        // No escape or nested-quote support: the literal runs to the
        // next double quote.
        let Some(close) = rest[1..].find('"') else {
            return Err(ParseError::IllegalToken {
                text: rest.to_owned(),
            });
        };
        let token = Token {
            kind: TokenKind::StringLiteral,
            text: rest[1..close + 1].to_owned(),
        };
        return Ok((token, close + 2));
    }

    if first.is_whitespace() {
        let end = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        let token = Token {
            kind: TokenKind::Whitespace,
            text: rest[..end].to_owned(),
        };
        return Ok((token, end));
    }

    if is_identifier_char(first) {
        let end = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        let token = Token {
            kind: TokenKind::Identifier,
            text: rest[..end].to_owned(),
        };
        return Ok((token, end));
    }

    // Report the unrecognized run up to the next whitespace so the
    // message shows a readable fragment rather than a lone character.
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Err(ParseError::IllegalToken {
        text: rest[..end].to_owned(),
    })
}
