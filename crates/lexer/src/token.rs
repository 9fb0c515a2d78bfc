//! Token types produced by [`crate::Tokenizer`].

use std::fmt;

/// Lexical category plus payload. Text payloads borrow from the source buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    Integer(u64),
    Float(f64),
    /// Contents of a double-quoted string, quotes stripped.
    Str(&'a str),
    /// Any single punctuation character (`/`, `-`, ...).
    Punct(char),
    /// `#`: everything up to the end of the line is a comment.
    CommentStart,
    End,
}

/// A token with its 1-based source position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: u32,
    pub column: u32,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }

    #[inline]
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    /// Identifier text, if this is an identifier.
    #[inline]
    pub fn identifier(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    /// Numeric value of an integer or float token.
    pub fn number(&self) -> Option<f64> {
        match self.kind {
            TokenKind::Integer(value) => Some(value as f64),
            TokenKind::Float(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(ident) => write!(f, "identifier `{ident}`"),
            TokenKind::Integer(value) => write!(f, "integer {value}"),
            TokenKind::Float(value) => write!(f, "float {value}"),
            TokenKind::Str(text) => write!(f, "string \"{text}\""),
            TokenKind::Punct(c) => write!(f, "`{c}`"),
            TokenKind::CommentStart => f.write_str("`#`"),
            TokenKind::End => f.write_str("end of input"),
        }
    }
}
