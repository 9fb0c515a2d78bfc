//! One-token-lookahead cursor shared by the `.obj` and `.mtl` parsers.

use lexer::{Token, TokenKind, Tokenizer};

use crate::error::FormatError;

pub(crate) struct TokenStream<'a> {
    lexer: Tokenizer<'a>,
    current: Token<'a>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(mut lexer: Tokenizer<'a>) -> Self {
        let current = lexer.next_token();
        Self { lexer, current }
    }

    #[inline]
    pub(crate) fn current(&self) -> Token<'a> {
        self.current
    }

    /// Move past the current token and return it.
    pub(crate) fn advance(&mut self) -> Token<'a> {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Drop every remaining token on `line`.
    pub(crate) fn skip_line(&mut self, line: u32) {
        while self.current.line == line && !self.current.is_end() {
            self.advance();
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str) -> FormatError {
        FormatError::UnexpectedToken {
            expected,
            found: self.current.kind.to_string(),
            line: self.current.line,
            column: self.current.column,
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &'static str) -> Result<&'a str, FormatError> {
        match self.current.kind {
            TokenKind::Identifier(ident) => {
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Identifier or quoted string, for file names.
    pub(crate) fn expect_name(&mut self, expected: &'static str) -> Result<&'a str, FormatError> {
        match self.current.kind {
            TokenKind::Identifier(text) | TokenKind::Str(text) => {
                self.advance();
                Ok(text)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    pub(crate) fn expect_integer(&mut self, expected: &'static str) -> Result<u64, FormatError> {
        match self.current.kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// A float token; integers are rejected.
    pub(crate) fn expect_float(&mut self) -> Result<f32, FormatError> {
        match self.current.kind {
            TokenKind::Float(value) => {
                self.advance();
                Ok(value as f32)
            }
            _ => Err(self.unexpected("float")),
        }
    }

    /// A float or integer token.
    pub(crate) fn expect_number(&mut self) -> Result<f32, FormatError> {
        match self.current.number() {
            Some(value) => {
                self.advance();
                Ok(value as f32)
            }
            None => Err(self.unexpected("number")),
        }
    }

    /// Optional `-` followed by a number.
    pub(crate) fn signed_number(&mut self) -> Result<f32, FormatError> {
        let negative = self.current.is_punct('-');
        if negative {
            self.advance();
        }
        let value = self.expect_number()?;
        Ok(if negative { -value } else { value })
    }

    pub(crate) fn expect_punct(&mut self, c: char, expected: &'static str) -> Result<(), FormatError> {
        if self.current.is_punct(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }
}
