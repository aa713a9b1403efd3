use std::path::Path;

use dumpbin::ForwardLibraries;

use super::{Artifact, ModuleDefinition, StubSource};

/// `vcvars32.bat` used when none is configured.
pub const DEFAULT_VCVARS: &str =
    r"C:\Program Files (x86)\Microsoft Visual Studio\2017\Enterprise\VC\Auxiliary\Build\vcvars32.bat";

/// Writes a single batch line terminated with `\r\n`.
macro_rules! batch_line {
    ($out:expr) => {
        $out.write_all(b"\r\n")
    };
    ($out:expr, $($arg:tt)*) => {
        write!($out, $($arg)*).and_then(|()| $out.write_all(b"\r\n"))
    };
}

/// Windows batch script that compiles the stub source and links it with the
/// module definition into the DLL and its import library.
///
/// The script recreates an `output\` directory next to itself. The import
/// library ends up at `output\<library name>.lib`.
#[derive(Debug, Clone, Copy)]
pub struct BuildScript<'a> {
    workdir: &'a Path,
    stem: &'a str,
    library_name: &'a str,
    vcvars: &'a str,
    forwards: &'a ForwardLibraries,
}

impl<'a> BuildScript<'a> {
    /// Creates a build script for the `<stem>.cpp` and `<stem>.def` files
    /// inside of `workdir`.
    pub fn new(
        workdir: &'a Path,
        stem: &'a str,
        library_name: &'a str,
        forwards: &'a ForwardLibraries,
    ) -> BuildScript<'a> {
        Self {
            workdir,
            stem,
            library_name,
            vcvars: DEFAULT_VCVARS,
            forwards,
        }
    }

    /// Sets the path to the 32-bit `vcvars32.bat` the script calls.
    pub fn vcvars(mut self, vcvars: &'a str) -> BuildScript<'a> {
        self.vcvars = vcvars;
        self
    }
}

impl Artifact for BuildScript<'_> {
    const EXTENSION: &'static str = "bat";

    fn write_to(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        batch_line!(out, "@echo off")?;
        batch_line!(out)?;
        batch_line!(
            out,
            ":: Set your *32 bit* VS vars path here. The rest should already be correct"
        )?;
        batch_line!(out, "set VCVARSFILE={}", self.vcvars)?;
        batch_line!(out, "set WORKDIR={}", self.workdir.display())?;
        batch_line!(out, "set CFILE={}.{}", self.stem, StubSource::EXTENSION)?;
        batch_line!(out, "set DEFFILE={}.{}", self.stem, ModuleDefinition::EXTENSION)?;

        write!(out, "set LIBS=")?;
        for library in self.forwards.iter() {
            write!(out, "\"{library}.lib\" ")?;
        }
        batch_line!(out)?;

        batch_line!(out, "set OUTPUTFILE={}", self.library_name)?;
        batch_line!(out)?;

        batch_line!(out, "call \"%VCVARSFILE%\"")?;
        batch_line!(out, "rd /S /Q output 1>nul 2>&1")?;
        batch_line!(out, "mkdir output")?;
        batch_line!(out)?;

        // /NOCOFFGRPINFO drops the debug directory. The remaining flags keep
        // the DLL small and easy to inspect.
        batch_line!(
            out,
            r#"cl /nologo /c /MT /W4 /O1 /Os /GS- /guard:cf- "%CFILE%" /Fo"%WORKDIR%\output\main.obj""#
        )?;
        batch_line!(
            out,
            concat!(
                r#"link /nologo /OUT:"%WORKDIR%\output\%OUTPUTFILE%" %LIBS% "#,
                r#"/IMPLIB:"%WORKDIR%\output\%OUTPUTFILE%.lib" /DLL /NOCOFFGRPINFO "#,
                r#"/MACHINE:X86 /SAFESEH /INCREMENTAL:NO /DEF:"%WORKDIR%\%DEFFILE%" "#,
                r#""%WORKDIR%\output\main.obj" /NODEFAULTLIB /NOENTRY /MERGE:.rdata=.text"#
            )
        )?;
        batch_line!(out, "if %ERRORLEVEL% NEQ 0 goto drats")?;
        batch_line!(out)?;

        batch_line!(out, r"del output\*.exp 1>nul")?;
        batch_line!(out, r"del output\main.obj 1>nul")?;
        batch_line!(out, "echo.")?;
        batch_line!(
            out,
            r"echo Your .lib file is ready. It can be found at output\%OUTPUTFILE%.lib."
        )?;
        batch_line!(out, "goto end")?;
        batch_line!(out)?;

        batch_line!(out, ":drats")?;
        batch_line!(out, "echo.")?;
        batch_line!(out, "echo The compiler failed to build the library.")?;
        batch_line!(out)?;

        batch_line!(out, ":end")?;
        batch_line!(out, "echo.")?;
        batch_line!(out, "pause")
    }
}
