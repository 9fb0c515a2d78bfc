//! Lexeme recognizers. Each one matches at the start of its input and
//! returns the remaining input, never skipping leading whitespace.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_till, take_while},
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair, tuple},
};

pub(crate) fn identifier(input: &str, dots: bool) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(move |c: char| c.is_ascii_alphanumeric() || c == '_' || (dots && c == '.')),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Unsigned decimal number. The flag is `true` when the text has a
/// fractional part or an exponent.
pub(crate) fn number(input: &str) -> IResult<&str, (&str, bool)> {
    alt((
        map(recognize(tuple((digit1, char('.'), digit0, opt(exponent)))), |text| (text, true)),
        map(recognize(tuple((char('.'), digit1, opt(exponent)))), |text| (text, true)),
        map(recognize(pair(digit1, exponent)), |text| (text, true)),
        map(digit1, |text| (text, false)),
    ))(input)
}

/// Double-quoted string that closes on the same line.
pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"' || c == '\n'), char('"'))(input)
}
