//! Recreates the import library of a 32-bit DLL from its `dumpbin /EXPORTS`
//! listing.
//!
//! The export table is parsed by the [`dumpbin`] crate. This crate turns the
//! parsed exports into a C++ stub source, a module definition file and a
//! batch script that builds a stand-in DLL and, with it, the import library.

pub mod driver;
pub mod error;
pub mod fsutils;
pub mod generate;

pub use driver::{Options, Summary, run};
pub use error::{Error, ErrorContext, ErrorKind, Result};
