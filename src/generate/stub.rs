use dumpbin::ExportRecord;

use super::{Artifact, INTRINSIC_PREFIX};

/// C++ source with a placeholder definition for every non-forwarded export.
///
/// ```text
/// extern "C" int __cdecl wcstoul() { return 1; }
/// extern "C" int __stdcall AlpcGetMessageAttribute(int, int) { return 2; }
/// ```
///
/// Every stub returns its ordinal. Identical function bodies would get folded
/// into one by the optimizer and all of those exports would end up at the
/// same address.
#[derive(Debug, Clone, Copy)]
pub struct StubSource<'a> {
    exports: &'a [ExportRecord],
}

impl<'a> StubSource<'a> {
    pub fn new(exports: &'a [ExportRecord]) -> StubSource<'a> {
        Self { exports }
    }

    /// Returns an iterator over the exports that get a stub.
    pub fn stubbed(&self) -> impl Iterator<Item = &'a ExportRecord> {
        self.exports
            .iter()
            .filter(|export| !export.is_forward_export())
    }
}

impl Artifact for StubSource<'_> {
    const EXTENSION: &'static str = "cpp";

    fn write_to(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        self.stubbed()
            .try_for_each(|export| writeln!(out, "{}", StubDefinition(export)))
    }
}

/// Formats a single stub definition.
struct StubDefinition<'a>(&'a ExportRecord);

impl std::fmt::Display for StubDefinition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let export = self.0;

        if export.is_extern_c() {
            f.write_str("extern \"C\" ")?;
        }

        write!(f, "int {} ", export.calling_convention())?;

        if export.is_intrinsic() {
            f.write_str(INTRINSIC_PREFIX)?;
        }

        write!(f, "{}(", export.name())?;

        // _AlpcGetMessageAttribute@8 -> AlpcGetMessageAttribute(int, int)
        for idx in 0..export.parameter_count() {
            if idx != 0 {
                f.write_str(", ")?;
            }
            f.write_str("int")?;
        }

        write!(f, ") {{ return {}; }}", export.ordinal())
    }
}
