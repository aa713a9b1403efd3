use std::num::ParseIntError;

use nom::{
    IResult, Parser,
    bytes::complete::{take_while_m_n, take_while1},
    character::complete::one_of,
    error::{ErrorKind, FromExternalError, ParseError},
};

/// Returns `true` if the character is a regex `\w` word character.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Parses a run of word characters.
///
/// ```ebnf
/// word = ( letter | digit | "_" ) , { letter | digit | "_" } ;
/// ```
pub fn parse_word<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    take_while1(is_word_char)(input)
}

/// Parses the leading character of a decorated C symbol name.
///
/// ```ebnf
/// decoration_prefix = "_" | "@" ;
/// ```
pub fn parse_decoration_prefix<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, char, E> {
    one_of("_@")(input)
}

/// Parses the rest of the input as `<name>@<bytes>` and returns the pair.
///
/// The split happens at the last `@` so names containing `@` (fastcall
/// decorations after the prefix has been removed do not, but C++ fragments
/// may) keep it in the name part. The suffix must be a non-empty decimal
/// number extending to the end of the input.
pub fn parse_stack_suffixed<'a, E>(input: &'a str) -> IResult<&'a str, (&'a str, u32), E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let Some((name, bytes)) = input.rsplit_once('@') else {
        return Err(nom::Err::Error(E::from_error_kind(input, ErrorKind::Char)));
    };

    if name.is_empty() || bytes.is_empty() || !bytes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(nom::Err::Error(E::from_error_kind(input, ErrorKind::Digit)));
    }

    let bytes = bytes
        .parse::<u32>()
        .map_err(|e| nom::Err::Error(E::from_external_error(input, ErrorKind::Digit, e)))?;

    Ok(("", (name, bytes)))
}

/// Parses between `min` and `max` hex digits into a u32.
pub fn parse_hex_u32<'a, E>(
    min: usize,
    max: usize,
) -> impl Parser<&'a str, Output = u32, Error = E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    take_while_m_n(min, max, |ch: char| ch.is_ascii_hexdigit())
        .map_res(|digits: &'a str| u32::from_str_radix(digits, 16))
}
