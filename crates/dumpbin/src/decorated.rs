//! Classification of the name column of an export row.
//!
//! ```ebnf
//! decorated_name = forward | sized | unsized | noname ;
//! forward        = { any } , " (forwarded to" , { any } ;
//! sized          = public_name , " = " , decoration_prefix , name , "@" , digits ;
//! unsized        = public_name , " = " , decoration_prefix , name ;
//! noname         = "[NONAME] " , decoration_prefix , name , "@" , digits ;
//! ```
//!
//! The alternatives are tried in the order listed. `sized` must come before
//! `unsized` because anything matching `sized` also matches `unsized`.
use std::num::ParseIntError;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until},
    combinator::{peek, rest, verify},
    error::{FromExternalError, ParseError},
    sequence::{preceded, terminated},
};

use crate::{
    parsers::{parse_decoration_prefix, parse_stack_suffixed},
    record::{CallingConvention, WORD_SIZE},
};

/// Substring marking a forwarded export.
pub(crate) const FORWARD_MARKER: &str = " (forwarded to";

/// Tag dumpbin puts in front of exports without a name.
pub(crate) const NONAME_TAG: &str = "[NONAME] ";

/// Shape of a decorated export name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratedShape<'a> {
    /// `ZwClose (forwarded to NTDLL.NtClose)`
    ///
    /// Holds the full decorated string for [`crate::resolve_forward`].
    Forward(&'a str),

    /// `NtClose = _NtClose@4`
    Sized {
        name: &'a str,
        calling_convention: CallingConvention,
        stack_bytes: u32,
    },

    /// `wcstoul = _wcstoul`
    Unsized { name: &'a str },

    /// `[NONAME] _RtlInternalThing@12`
    NoName {
        name: &'a str,
        calling_convention: CallingConvention,
        stack_bytes: u32,
    },
}

impl<'a> DecoratedShape<'a> {
    /// Returns the undecorated name.
    ///
    /// Forward shapes return `None`, the name is only known after resolving
    /// the forward.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Forward(_) => None,
            Self::Sized { name, .. } | Self::Unsized { name } | Self::NoName { name, .. } => {
                Some(*name)
            }
        }
    }

    /// Returns the calling convention recovered from the decoration.
    pub fn calling_convention(&self) -> CallingConvention {
        match self {
            Self::Sized {
                calling_convention, ..
            }
            | Self::NoName {
                calling_convention, ..
            } => *calling_convention,
            Self::Forward(_) | Self::Unsized { .. } => CallingConvention::Cdecl,
        }
    }

    /// Returns the number of word sized parameters.
    ///
    /// The `@N` byte count is divided by [`WORD_SIZE`] with truncation.
    pub fn parameter_count(&self) -> u32 {
        match self {
            Self::Sized { stack_bytes, .. } | Self::NoName { stack_bytes, .. } => {
                stack_bytes / WORD_SIZE
            }
            Self::Forward(_) | Self::Unsized { .. } => 0,
        }
    }

    #[inline]
    pub fn is_no_name(&self) -> bool {
        matches!(self, Self::NoName { .. })
    }
}

/// Classifies a decorated name into one of the four known shapes.
///
/// Returns `None` if the name matches none of them.
pub fn classify(decorated: &str) -> Option<DecoratedShape<'_>> {
    let result: IResult<_, _, nom::error::Error<&str>> = alt((
        parse_forward_shape,
        parse_sized_shape,
        parse_unsized_shape,
        parse_noname_shape,
    ))
    .parse(decorated);

    result.ok().map(|(_, shape)| shape)
}

/// Parses the public name to the left of `" = "`.
fn parse_public_name<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    terminated(
        verify(take_until(" = "), |name: &str| !name.is_empty()),
        tag(" = "),
    )
    .parse(input)
}

fn parse_forward_shape<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, DecoratedShape<'a>, E> {
    preceded(peek(take_until(FORWARD_MARKER)), rest)
        .map(DecoratedShape::Forward)
        .parse(input)
}

fn parse_sized_shape<'a, E>(input: &'a str) -> IResult<&'a str, DecoratedShape<'a>, E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    (parse_public_name, parse_decoration_prefix, parse_stack_suffixed)
        .map(|(name, prefix, (_, stack_bytes))| DecoratedShape::Sized {
            name,
            calling_convention: CallingConvention::from_sized_prefix(prefix),
            stack_bytes,
        })
        .parse(input)
}

fn parse_unsized_shape<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, DecoratedShape<'a>, E> {
    (
        parse_public_name,
        parse_decoration_prefix,
        verify(rest, |internal: &str| !internal.is_empty()),
    )
        .map(|(name, _, _)| DecoratedShape::Unsized { name })
        .parse(input)
}

fn parse_noname_shape<'a, E>(input: &'a str) -> IResult<&'a str, DecoratedShape<'a>, E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    preceded(
        tag(NONAME_TAG),
        (parse_decoration_prefix, parse_stack_suffixed),
    )
    .map(|(prefix, (name, stack_bytes))| DecoratedShape::NoName {
        name,
        calling_convention: CallingConvention::from_sized_prefix(prefix),
        stack_bytes,
    })
    .parse(input)
}

/// Removes a sized decoration (`_Name@N`, `@Name@N`) from a name.
///
/// Returns the name unchanged if it is not decorated.
pub(crate) fn undecorate_sized(name: &str) -> &str {
    let result: IResult<_, _, nom::error::Error<&str>> =
        preceded(parse_decoration_prefix, parse_stack_suffixed).parse(name);

    result.map(|(_, (inner, _))| inner).unwrap_or(name)
}
