//! Artifact generators.
//!
//! Each generator renders one text file from the parsed export table:
//! - [`StubSource`] a C++ file with a placeholder definition per export.
//! - [`ModuleDefinition`] the `.def` file describing the export table.
//! - [`BuildScript`] a batch file running the compiler and linker.
//!
//! Compiling the stub source and linking it with the module definition file
//! produces a DLL with the same export surface as the original and, as a side
//! effect, its import library.

mod moduledef;
mod script;
mod stub;

pub use moduledef::ModuleDefinition;
pub use script::{BuildScript, DEFAULT_VCVARS};
pub use stub::StubSource;

/// Prefix for stubs whose export name collides with a reserved identifier.
///
/// The module definition file maps the public name back onto the prefixed
/// symbol.
pub const INTRINSIC_PREFIX: &str = "_INTRINSIC_";

/// A generated text file.
pub trait Artifact {
    /// File extension of the artifact without the leading `.`.
    const EXTENSION: &'static str;

    /// Writes the artifact contents.
    fn write_to(&self, out: &mut dyn std::io::Write) -> std::io::Result<()>;

    /// Renders the artifact into a string.
    fn render(&self) -> String {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)
            .unwrap_or_else(|_| unreachable!("writing to a Vec does not fail"));
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
