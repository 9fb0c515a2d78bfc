//! Tokenizer for the line-oriented text formats the asset loaders read.
//!
//! Tokens are produced lazily, one per [`Tokenizer::next_token`] call.
//! Lexical errors never stop the scan: they are handed to an error hook
//! (logging by default) and a best-effort token is still returned, so the
//! caller decides what is fatal.

mod error;
mod scan;
pub mod token;

pub use error::{LexError, LexErrorCode};
pub use token::{Token, TokenKind};

type ErrorHook<'a> = Box<dyn FnMut(&LexError) + 'a>;

pub struct Tokenizer<'a> {
    rest: &'a str,
    line: u32,
    column: u32,
    dots_in_identifiers: bool,
    on_error: ErrorHook<'a>,
}

impl<'a> Tokenizer<'a> {
    /// A leading UTF-8 byte-order mark is skipped.
    pub fn new(src: &'a str) -> Self {
        Self {
            rest: src.strip_prefix('\u{FEFF}').unwrap_or(src),
            line: 1,
            column: 1,
            dots_in_identifiers: false,
            on_error: Box::new(|err| log::warn!("Lexical error at {err}")),
        }
    }

    /// Allow `.` after the first character of an identifier
    /// (`file.mtl`, `Material.001`).
    pub fn dots_in_identifiers(mut self, enabled: bool) -> Self {
        self.dots_in_identifiers = enabled;
        self
    }

    /// Replace the default (logging) error hook.
    pub fn with_error_hook(mut self, hook: impl FnMut(&LexError) + 'a) -> Self {
        self.on_error = Box::new(hook);
        self
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);

        let Some(c) = self.rest.chars().next() else {
            return Token::new(TokenKind::End, line, column);
        };

        if let Ok((rest, ident)) = scan::identifier(self.rest, self.dots_in_identifiers) {
            self.consume(rest);
            return Token::new(TokenKind::Identifier(ident), line, column);
        }

        if let Ok((rest, (text, is_float))) = scan::number(self.rest) {
            self.consume(rest);
            let kind = if is_float {
                self.float(text, line, column)
            } else {
                self.integer(text, line, column)
            };
            return Token::new(kind, line, column);
        }

        let kind = match c {
            '"' => self.string(line, column),
            '#' => {
                let src = self.rest;
                self.consume(&src[1..]);
                TokenKind::CommentStart
            }
            _ => {
                let src = self.rest;
                self.consume(&src[c.len_utf8()..]);
                if !c.is_ascii() {
                    self.report(
                        LexErrorCode::InvalidCharacter,
                        format!("unexpected character '{c}'"),
                        line,
                        column,
                    );
                }
                TokenKind::Punct(c)
            }
        };
        Token::new(kind, line, column)
    }

    fn skip_whitespace(&mut self) {
        let mut chars = self.rest.char_indices();
        let end = loop {
            match chars.next() {
                Some((_, '\n')) => {
                    self.line += 1;
                    self.column = 1;
                }
                Some((_, ' ' | '\t' | '\r' | '\x0C')) => self.column += 1,
                Some((idx, _)) => break idx,
                None => break self.rest.len(),
            }
        };
        self.rest = &self.rest[end..];
    }

    /// Move the cursor to `rest`, which must be a suffix of the current input
    /// containing no newline in the skipped part.
    fn consume(&mut self, rest: &'a str) {
        let taken = &self.rest[..self.rest.len() - rest.len()];
        self.column += taken.chars().count() as u32;
        self.rest = rest;
    }

    fn integer(&mut self, text: &str, line: u32, column: u32) -> TokenKind<'a> {
        match text.parse::<u64>() {
            Ok(value) => TokenKind::Integer(value),
            Err(_) => {
                self.report(
                    LexErrorCode::IntegerOverflow,
                    format!("integer literal '{text}' does not fit in 64 bits"),
                    line,
                    column,
                );
                TokenKind::Integer(u64::MAX)
            }
        }
    }

    fn float(&mut self, text: &str, line: u32, column: u32) -> TokenKind<'a> {
        match text.parse::<f64>() {
            Ok(value) => TokenKind::Float(value),
            Err(e) => {
                self.report(
                    LexErrorCode::MalformedNumber,
                    format!("malformed number '{text}': {e}"),
                    line,
                    column,
                );
                TokenKind::Float(0.0)
            }
        }
    }

    fn string(&mut self, line: u32, column: u32) -> TokenKind<'a> {
        if let Ok((rest, text)) = scan::quoted(self.rest) {
            self.consume(rest);
            return TokenKind::Str(text);
        }

        // Unterminated: the string runs to the end of the line.
        let src = self.rest;
        let body = &src[1..];
        let len = body.find('\n').unwrap_or(body.len());
        let (text, rest) = body.split_at(len);
        self.consume(rest);
        self.report(
            LexErrorCode::UnterminatedString,
            "unterminated string literal".to_string(),
            line,
            column,
        );
        TokenKind::Str(text)
    }

    fn report(&mut self, code: LexErrorCode, message: String, line: u32, column: u32) {
        let err = LexError {
            code,
            message,
            line,
            column,
        };
        (self.on_error)(&err);
    }
}

/// Yields every token before end-of-input.
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (!token.is_end()).then_some(token)
    }
}
