//! Parser for the output of [`dumpbin /EXPORTS`](https://learn.microsoft.com/en-us/cpp/build/reference/exports)
//! run against a 32-bit DLL.
//!
//! The listing is the only input available when a DLL ships without its
//! import library. Each table row carries enough information in the decorated
//! name to reconstruct the external symbol surface of the export.
//!
//! An example listing looks like this (preamble shortened).
//! ```text
//! Dump of file ntdll.dll
//!
//! File Type: DLL
//!
//!   Section contains the following exports for ntdll.dll
//!
//!     ordinal hint RVA      name
//!
//!           1    0 00001000 wcstoul = _wcstoul
//!           2    1 00002000 AlpcGetMessageAttribute = _AlpcGetMessageAttribute@8
//!           3    2          ZwCreateUserProcess (forwarded to NTDLL.NtCreateUserProcess)
//!           4      00003000 [NONAME] _RtlInternalThing@12
//!
//!   Summary
//!
//!         1000 .data
//! ```
//!
//! Decorated name shapes
//!
//! The name column takes one of four shapes. They are tried in this order and
//! the first match wins:
//! 1. `Name (forwarded to Library.Function)` - forward export.
//! 2. `Name = _Name@8` or `Name = @Name@8` - stdcall/fastcall with 8 bytes of
//!    arguments.
//! 3. `Name = _Name` - cdecl function or data export.
//! 4. `[NONAME] _Name@8` - ordinal only export.
//!
//! Shape 2 has to be tried before shape 3 since every stdcall decoration is
//! also a valid cdecl decoration with `@8` being part of the name.

mod decorated;
mod error;
mod forward;
mod intrinsics;
mod listing;
mod parsers;
mod record;

pub use decorated::{DecoratedShape, classify};
pub use error::{Error, RecordError};
pub use forward::{ForwardLibraries, ForwardShape, ForwardTarget, resolve_forward};
pub use intrinsics::is_intrinsic;
pub use listing::{DUMPBIN_PREAMBLE_LINES, ExportListing, ListingParser, SkippedRow};
pub use record::{CallingConvention, ExportKind, ExportRecord, WORD_SIZE};
