/// Errors which stop a listing from being parsed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read listing: {0}")]
    Io(#[from] std::io::Error),

    /// The listing did not contain a single usable export row.
    ///
    /// This is usually a listing produced by the 64-bit dumpbin (no name
    /// decorations) or a file that is not dumpbin output at all.
    #[error("no exports found in listing")]
    NoExports,
}

/// Errors for a single table row.
///
/// These are recoverable. The row is dropped and parsing continues with the
/// next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The name column does not match any known decoration shape.
    ///
    /// Undecorated names (`Kei386EoiHelper = Kei386EoiHelper@0`) and
    /// demangled C++ names end up here.
    #[error("failed to parse export name \"{0}\"")]
    UnrecognizedDecoration(String),

    /// A forward marker is present but the destination could not be parsed.
    #[error("failed to parse forward export name \"{0}\"")]
    UnrecognizedForward(String),
}
