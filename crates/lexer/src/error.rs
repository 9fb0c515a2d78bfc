use thiserror::Error;

/// What went wrong while scanning a lexeme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexErrorCode {
    UnterminatedString,
    IntegerOverflow,
    MalformedNumber,
    InvalidCharacter,
}

/// Non-fatal scanning error handed to the tokenizer's error hook.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct LexError {
    pub code: LexErrorCode,
    pub message: String,
    pub line: u32,
    pub column: u32,
}
