use std::{io::BufRead, num::ParseIntError};

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{space0, space1},
    combinator::{opt, rest, verify},
    error::{FromExternalError, ParseError},
    sequence::{preceded, terminated},
};

use crate::{
    decorated::{DecoratedShape, classify},
    error::{Error, RecordError},
    forward::{ForwardLibraries, resolve_forward},
    parsers::parse_hex_u32,
    record::ExportRecord,
};

/// Number of lines `dumpbin /EXPORTS` prints before the first table row.
pub const DUMPBIN_PREAMBLE_LINES: usize = 19;

/// Parsed export table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportListing {
    /// Exports in listing order.
    pub exports: Vec<ExportRecord>,

    /// Table rows that were dropped.
    pub skipped: Vec<SkippedRow>,
}

/// A table row that could not be turned into an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the listing.
    pub line: usize,

    pub error: RecordError,
}

/// Parser for `dumpbin /EXPORTS` listings.
#[derive(Debug, Clone, Copy)]
pub struct ListingParser<'a> {
    library_name: &'a str,
    preamble_lines: usize,
}

impl<'a> ListingParser<'a> {
    /// Creates a parser for the listing of `library_name` (e.g. `ntdll.dll`).
    pub fn new(library_name: &'a str) -> ListingParser<'a> {
        Self {
            library_name,
            preamble_lines: DUMPBIN_PREAMBLE_LINES,
        }
    }

    /// Sets the number of header lines to skip.
    pub fn preamble_lines(mut self, lines: usize) -> ListingParser<'a> {
        self.preamble_lines = lines;
        self
    }

    /// Parses a listing from a string.
    pub fn parse_str(
        &self,
        data: &str,
        forwards: &mut ForwardLibraries,
    ) -> Result<ExportListing, Error> {
        self.parse_reader(data.as_bytes(), forwards)
    }

    /// Parses a listing from a reader.
    ///
    /// Libraries of forwarded exports are added to `forwards`. Returns
    /// [`Error::NoExports`] if no export could be parsed.
    pub fn parse_reader(
        &self,
        reader: impl BufRead,
        forwards: &mut ForwardLibraries,
    ) -> Result<ExportListing, Error> {
        let mut listing = ExportListing::default();

        for (idx, line) in reader
            .split(b'\n')
            .enumerate()
            .skip(self.preamble_lines)
        {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let line_number = idx + 1;

            let Some(result) = self.parse_row(line.trim_end(), forwards) else {
                log::trace!("export table ends at line {line_number}");
                break;
            };

            match result {
                Ok(record) => {
                    log::debug!(
                        "ordinal {} {}: {} ({} parameters{}{})",
                        record.ordinal(),
                        record.name(),
                        record.calling_convention(),
                        record.parameter_count(),
                        if record.is_no_name() { ", noname" } else { "" },
                        if record.is_intrinsic() {
                            ", intrinsic"
                        } else {
                            ""
                        },
                    );
                    listing.exports.push(record);
                }
                Err(error) => {
                    log::warn!("line {line_number}: {error}");
                    listing.skipped.push(SkippedRow {
                        line: line_number,
                        error,
                    });
                }
            }
        }

        if listing.exports.is_empty() {
            return Err(Error::NoExports);
        }

        Ok(listing)
    }

    /// Parses a single table row.
    ///
    /// Returns `None` if the line is not a table row, which marks the end of
    /// the table.
    pub fn parse_row(
        &self,
        line: &str,
        forwards: &mut ForwardLibraries,
    ) -> Option<Result<ExportRecord, RecordError>> {
        let parsed: IResult<_, _, nom::error::Error<&str>> = parse_export_row(line);
        let (_, row) = parsed.ok()?;
        Some(self.build_record(row, forwards))
    }

    fn build_record(
        &self,
        row: ExportRow<'_>,
        forwards: &mut ForwardLibraries,
    ) -> Result<ExportRecord, RecordError> {
        let shape = classify(row.name)
            .ok_or_else(|| RecordError::UnrecognizedDecoration(row.name.to_string()))?;

        let record = match shape {
            DecoratedShape::Forward(decorated) => {
                let target = resolve_forward(decorated, self.library_name)?;
                forwards.insert(target.library);
                ExportRecord::forward(row.ordinal, target.name, target.library, target.function)
                    .with_no_name(target.no_name)
            }
            DecoratedShape::Sized { name, .. }
            | DecoratedShape::Unsized { name }
            | DecoratedShape::NoName { name, .. } => ExportRecord::function(
                row.ordinal,
                name,
                shape.calling_convention(),
                shape.parameter_count(),
            )
            .with_no_name(shape.is_no_name()),
        };

        Ok(record.with_location(row.hint, row.rva))
    }
}

/// Columns of an export table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExportRow<'a> {
    ordinal: u32,
    hint: Option<u16>,
    rva: Option<u32>,
    name: &'a str,
}

/// Parses an export table row.
///
/// ```ebnf
/// row     = { space } , ordinal , "  " , { space } , [ hint , space , { space } ] ,
///           [ rva , space , { space } ] , name ;
/// ordinal = digit , { digit } ;
/// hint    = hex_digit , [ hex_digit , [ hex_digit , [ hex_digit ] ] ] ;
/// rva     = 8 * hex_digit ;
/// ```
///
/// The hint column is blank for `[NONAME]` exports and the RVA column is blank
/// for forwarded exports.
fn parse_export_row<'a, E>(input: &'a str) -> IResult<&'a str, ExportRow<'a>, E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    (
        preceded(space0, nom::character::complete::u32),
        preceded(tag("  "), space0),
        opt(terminated(parse_hex_u32(1, 4), space1)),
        opt(terminated(parse_hex_u32(8, 8), space1)),
        verify(rest, |name: &str| !name.is_empty()),
    )
        .map(|(ordinal, _, hint, rva, name)| ExportRow {
            ordinal,
            hint: hint.map(|hint| hint as u16),
            rva,
            name,
        })
        .parse(input)
}
