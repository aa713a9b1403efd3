//! see: https://learn.microsoft.com/en-us/cpp/build/reference/module-definition-dot-def-files
use dumpbin::{ExportKind, ExportRecord};

use super::{Artifact, INTRINSIC_PREFIX};

/// Module definition file describing the export table.
///
/// ```text
/// LIBRARY ntdll.dll
/// EXPORTS
///     wcstoul
///     ZwCreateUserProcess = NTDLL.NtCreateUserProcess
///     _purecall = _INTRINSIC__purecall
///     RtlHidden @12 NONAME
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModuleDefinition<'a> {
    library_name: &'a str,
    exports: &'a [ExportRecord],
}

impl<'a> ModuleDefinition<'a> {
    /// Creates a module definition for the library file `library_name`.
    pub fn new(library_name: &'a str, exports: &'a [ExportRecord]) -> ModuleDefinition<'a> {
        Self {
            library_name,
            exports,
        }
    }
}

impl Artifact for ModuleDefinition<'_> {
    const EXTENSION: &'static str = "def";

    fn write_to(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(out, "LIBRARY {}", DefString(self.library_name))?;
        writeln!(out, "EXPORTS")?;

        self.exports
            .iter()
            .try_for_each(|export| writeln!(out, "{}", ExportDirective(export)))
    }
}

/// Formats the `EXPORTS` entry of an export.
///
/// entryname[= internal_name|other_module.exported_name] [@ordinal NONAME]
///
/// The ordinal is only written for NONAME exports.
struct ExportDirective<'a>(&'a ExportRecord);

impl std::fmt::Display for ExportDirective<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let export = self.0;

        write!(f, "\t{}", export.name())?;

        match export.kind() {
            ExportKind::Forward { library, function } => {
                write!(f, " = {library}.{function}")?;
            }
            ExportKind::Function { .. } if export.is_intrinsic() => {
                write!(f, " = {INTRINSIC_PREFIX}{}", export.name())?;
            }
            ExportKind::Function { .. } => {}
        }

        if export.is_no_name() {
            write!(f, " @{} NONAME", export.ordinal())?;
        }

        Ok(())
    }
}

/// Formats a string argument, quoting it if it contains characters that
/// would split it into multiple arguments.
struct DefString<'a>(&'a str);

impl std::fmt::Display for DefString<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self
            .0
            .contains(|ch: char| ch.is_ascii_whitespace() || ch == ';')
        {
            write!(f, "\"{}\"", self.0)
        } else {
            f.write_str(self.0)
        }
    }
}
