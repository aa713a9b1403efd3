//! Forward export resolution.
//!
//! A forwarded export has no code in the DLL. The import library needs to
//! link against the library the export is forwarded to, so the destination
//! has to be turned into something a linker can find.
//!
//! ```ebnf
//! forward     = name , " (forwarded to " , destination , ")" ;
//! destination = direct | runtime | compat ;
//! direct      = word , "." , function ;
//! runtime     = "api-ms-win-crt" , any , { any } , "." , function ;
//! compat      = "api-ms-win-" , word_char , any , { any } , "." , function ;
//! ```
//!
//! API set names (`api-ms-win-*`) are not real files. They get mapped to the
//! library that implements them with the heuristics below.
use indexmap::IndexSet;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, tag_no_case, take_until},
    character::complete::{char, satisfy},
    combinator::{rest, verify},
    error::ParseError,
    sequence::{separated_pair, terminated},
};

use crate::{
    decorated::{NONAME_TAG, undecorate_sized},
    error::RecordError,
    parsers::{is_word_char, parse_word},
};

const FORWARD_SEPARATOR: &str = " (forwarded to ";

/// Library the `api-ms-win-core-rtlsupport-*` API sets resolve to.
const RTLSUPPORT_LIBRARY: &str = "NTDLL";

/// Default library for other `api-ms-win-*` API sets.
const COMPAT_LIBRARY: &str = "kernel32";

/// Fallback for [`COMPAT_LIBRARY`] when generating the import library of
/// [`COMPAT_LIBRARY`] itself.
const COMPAT_FALLBACK_LIBRARY: &str = "kernelbase";

/// Library implementing the `api-ms-win-crt-*` API sets.
const RUNTIME_LIBRARY: &str = "ucrtbase";

/// Import library name for [`RUNTIME_LIBRARY`].
const RUNTIME_IMPORT_LIBRARY: &str = "ucrt";

/// How a forward destination was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardShape {
    /// Forward to a real library, used as is.
    Direct,

    /// Forward to a generic `api-ms-win-*` API set.
    Compatibility,

    /// Forward to a C runtime `api-ms-win-crt-*` API set.
    Runtime,
}

/// A resolved forward export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForwardTarget<'a> {
    /// Public name of the export.
    pub name: &'a str,

    /// Whether the export was tagged `[NONAME]`.
    pub no_name: bool,

    /// Library named in the listing.
    pub declared_library: &'a str,

    /// Library to link against.
    pub library: &'a str,

    /// Export in `library`.
    pub function: &'a str,

    pub shape: ForwardShape,
}

/// Resolves a forwarded export from its decorated name.
///
/// `library_name` is the file name of the library being generated. It is
/// used for breaking the `kernel32.dll` -> `api-ms-win-*` -> `kernel32.dll`
/// cycle.
pub fn resolve_forward<'a>(
    decorated: &'a str,
    library_name: &str,
) -> Result<ForwardTarget<'a>, RecordError> {
    let parsed: IResult<_, _, nom::error::Error<&str>> = parse_forward(decorated);
    let Ok((_, (name, destination))) = parsed else {
        return Err(RecordError::UnrecognizedForward(decorated.to_string()));
    };

    let (name, no_name) = match name.strip_prefix(NONAME_TAG) {
        Some(tagged) => (undecorate_sized(tagged), true),
        None => (name, false),
    };

    let target = |declared_library: &'a str,
                  library: &'a str,
                  function: &'a str,
                  shape: ForwardShape| ForwardTarget {
        name,
        no_name,
        declared_library,
        library,
        function,
        shape,
    };

    // Forward to a proper DLL. Usually ntdll or kernelbase
    let direct: IResult<_, _, nom::error::Error<&str>> = parse_direct_destination(destination);
    if let Ok((_, (library, function))) = direct {
        log::info!("{name} forwards to {library}.{function}");
        return Ok(target(library, library, function, ForwardShape::Direct));
    }

    let Some((declared, function)) = split_api_set(destination) else {
        return Err(RecordError::UnrecognizedForward(decorated.to_string()));
    };

    if is_runtime_api_set(declared) {
        log::warn!(
            "{name} forwards to {declared}.{function} which resolves to \
            {RUNTIME_LIBRARY}; linking may need the runtime import libraries"
        );
        return Ok(target(
            declared,
            RUNTIME_LIBRARY,
            function,
            ForwardShape::Runtime,
        ));
    }

    if is_compat_api_set(declared) {
        let library = if declared.to_ascii_lowercase().contains("rtlsupport-") {
            RTLSUPPORT_LIBRARY
        } else if library_name.eq_ignore_ascii_case(&format!("{COMPAT_LIBRARY}.dll")) {
            COMPAT_FALLBACK_LIBRARY
        } else {
            COMPAT_LIBRARY
        };

        log::info!("{name} forwards to {declared}.{function}, using {library}");
        return Ok(target(
            declared,
            library,
            function,
            ForwardShape::Compatibility,
        ));
    }

    Err(RecordError::UnrecognizedForward(decorated.to_string()))
}

/// Parses `name (forwarded to destination)` and returns the name and
/// destination.
fn parse_forward<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, &'a str), E> {
    (
        terminated(
            verify(take_until(FORWARD_SEPARATOR), |name: &str| !name.is_empty()),
            tag(FORWARD_SEPARATOR),
        ),
        verify(rest, |destination: &str| destination.contains(')')),
    )
        .map(|(name, destination): (&'a str, &'a str)| {
            let end = destination.rfind(')').unwrap_or(destination.len());
            (name, &destination[..end])
        })
        .parse(input)
}

/// Parses `library.function` where library only contains word characters.
fn parse_direct_destination<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, &'a str), E> {
    separated_pair(
        parse_word,
        char('.'),
        verify(rest, |function: &str| !function.is_empty()),
    )
    .parse(input)
}

/// Splits an API set destination at the last `.` into the API set name and
/// the function.
fn split_api_set(destination: &str) -> Option<(&str, &str)> {
    destination
        .rsplit_once('.')
        .filter(|(library, function)| !library.is_empty() && !function.is_empty())
}

fn is_runtime_api_set(library: &str) -> bool {
    let parsed: IResult<_, _, nom::error::Error<&str>> = (
        tag_no_case("api-ms-win-crt"),
        verify(rest, |suffix: &str| !suffix.is_empty()),
    )
        .parse(library);

    parsed.is_ok()
}

fn is_compat_api_set(library: &str) -> bool {
    let parsed: IResult<_, _, nom::error::Error<&str>> = (
        tag_no_case("api-ms-win-"),
        satisfy(is_word_char),
        verify(rest, |suffix: &str| !suffix.is_empty()),
    )
        .parse(library);

    parsed.is_ok() && !is_runtime_api_set(library)
}

/// Distinct set of libraries forwarded exports resolve to.
///
/// Names are stored lower case in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForwardLibraries(IndexSet<String>);

impl ForwardLibraries {
    pub fn new() -> ForwardLibraries {
        Self::default()
    }

    /// Adds the library to the set.
    ///
    /// The C runtime base library is recorded under the name of its import
    /// library. Returns `true` if the library was not present yet.
    pub fn insert(&mut self, library: &str) -> bool {
        let mut name = library.to_ascii_lowercase();
        if name == RUNTIME_LIBRARY {
            name = RUNTIME_IMPORT_LIBRARY.to_string();
        }

        if self.0.contains(&name) {
            return false;
        }

        log::info!("added {name}.lib to the linker inputs");
        self.0.insert(name)
    }

    #[inline]
    pub fn contains(&self, library: &str) -> bool {
        self.0.contains(library)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the library names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ForwardLibraries, ForwardShape, ForwardTarget, resolve_forward};
    use crate::error::RecordError;

    #[test]
    fn direct() {
        let target = resolve_forward(
            "ZwCreateUserProcess (forwarded to NTDLL.NtCreateUserProcess)",
            "kernel32.dll",
        )
        .expect("Could not resolve forward");

        assert_eq!(
            target,
            ForwardTarget {
                name: "ZwCreateUserProcess",
                no_name: false,
                declared_library: "NTDLL",
                library: "NTDLL",
                function: "NtCreateUserProcess",
                shape: ForwardShape::Direct,
            }
        );
    }

    #[test]
    fn direct_ordinal() {
        let target = resolve_forward("Foo (forwarded to KERNELBASE.#12)", "kernel32.dll")
            .expect("Could not resolve forward");

        assert_eq!(target.library, "KERNELBASE");
        assert_eq!(target.function, "#12");
    }

    #[test]
    fn compat_rtlsupport() {
        let target = resolve_forward(
            "RtlCaptureContext (forwarded to api-ms-win-core-rtlsupport-l1-1-0.RtlCaptureContext)",
            "kernel32.dll",
        )
        .expect("Could not resolve forward");

        assert_eq!(target.shape, ForwardShape::Compatibility);
        assert_eq!(target.library, "NTDLL");
        assert_eq!(target.function, "RtlCaptureContext");
        assert_eq!(
            target.declared_library,
            "api-ms-win-core-rtlsupport-l1-1-0"
        );
    }

    #[test]
    fn compat_default_library() {
        let data = "GetTickCount (forwarded to API-MS-WIN-CORE-SYSINFO-L1-1-0.GetTickCount)";

        let target = resolve_forward(data, "advapi32.dll").expect("Could not resolve forward");
        assert_eq!(target.library, "kernel32");

        let target = resolve_forward(data, "kernel32.dll").expect("Could not resolve forward");
        assert_eq!(target.library, "kernelbase");

        let target = resolve_forward(data, "KERNEL32.DLL").expect("Could not resolve forward");
        assert_eq!(target.library, "kernelbase");
    }

    #[test]
    fn runtime() {
        let target = resolve_forward(
            "_wcsicmp (forwarded to api-ms-win-crt-string-l1-1-0._wcsicmp)",
            "msvcrt.dll",
        )
        .expect("Could not resolve forward");

        assert_eq!(target.shape, ForwardShape::Runtime);
        assert_eq!(target.library, "ucrtbase");
        assert_eq!(target.function, "_wcsicmp");
    }

    #[test]
    fn noname_forward() {
        let target = resolve_forward(
            "[NONAME] _RtlHidden@8 (forwarded to NTDLL.RtlHidden)",
            "kernel32.dll",
        )
        .expect("Could not resolve forward");

        assert!(target.no_name);
        assert_eq!(target.name, "RtlHidden");
    }

    #[test]
    fn unrecognized() {
        for data in [
            "Foo (forwarded to nowhere)",
            "Foo (forwarded to ext-ms-win-foo-l1-1-0.Foo)",
            "Foo (forwarded to NTDLL.Foo",
            " (forwarded to NTDLL.Foo)",
        ] {
            assert_eq!(
                resolve_forward(data, "kernel32.dll"),
                Err(RecordError::UnrecognizedForward(data.to_string())),
                "{data} should not resolve",
            );
        }
    }

    #[test]
    fn library_set_idempotent() {
        let mut libs = ForwardLibraries::new();
        assert!(libs.insert("NTDLL"));
        assert!(!libs.insert("ntdll"));
        assert!(!libs.insert("NtDll"));
        assert_eq!(libs.len(), 1);
        assert!(libs.contains("ntdll"));
    }

    #[test]
    fn library_set_runtime_alias() {
        let mut libs = ForwardLibraries::new();
        assert!(libs.insert("ucrtbase"));
        assert!(!libs.insert("UCRTBASE"));
        assert!(libs.insert("kernelbase"));

        assert_eq!(libs.iter().collect::<Vec<_>>(), ["ucrt", "kernelbase"]);
    }
}
