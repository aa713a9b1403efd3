use std::{
    collections::{HashSet, VecDeque},
    ffi::OsString,
    path::PathBuf,
};

use clap::{ArgAction, Parser};
use dumpbin::DUMPBIN_PREAMBLE_LINES;
use dumplib::{Options, generate::DEFAULT_VCVARS};

use crate::logging::ColorOption;

const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const AFTER_HELP: &str = "\
Where <LISTING> was created with the x86 version of dumpbin using:
  dumpbin /EXPORTS file.dll > <LISTING>

Example: dumplib ntdll-exports.txt ntdll.dll";

#[derive(Parser, Debug)]
#[command(name = CARGO_PKG_NAME, version, about, after_help = AFTER_HELP)]
pub struct CliArgs {
    /// Output of `dumpbin /EXPORTS` for the library
    #[arg(value_name = "LISTING")]
    pub listing: PathBuf,

    /// File name of the library (e.g. ntdll.dll)
    #[arg(value_name = "DLLNAME")]
    pub library_name: String,

    /// Write the generated files to <dir> [default: directory of <LISTING>]
    #[arg(short, long, value_name = "dir")]
    pub output_dir: Option<PathBuf>,

    /// Number of header lines before the export table
    #[arg(long, value_name = "lines", default_value_t = DUMPBIN_PREAMBLE_LINES)]
    pub preamble_lines: usize,

    /// Path to the 32-bit vcvars32.bat called by the build script
    #[arg(long, value_name = "file", default_value = DEFAULT_VCVARS, hide_default_value = true)]
    pub vcvars: String,

    /// Use colors in diagnostic messages
    #[arg(
        long = "color-diagnostics",
        value_name = "color",
        value_enum,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = ColorOption::Auto,
        default_missing_value = "always",
    )]
    pub color: ColorOption,

    /// Print more information (-vv for even more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    pub fn into_options(self) -> Options {
        Options {
            listing: self.listing,
            library_name: self.library_name,
            output_dir: self.output_dir,
            preamble_lines: self.preamble_lines,
            vcvars: self.vcvars,
        }
    }
}

pub fn log_cmdline(args: &[OsString]) {
    log::debug!("{CARGO_PKG_NAME} version {CARGO_PKG_VERSION}");

    let args = args.iter().map(|s| s.to_string_lossy()).collect::<Vec<_>>();
    log::debug!("command line: {}", args.join(" "));
}

/// Replaces `@file` arguments with the arguments inside of the file.
///
/// Response files may reference other response files. Each file is only
/// expanded once. An `@file` argument naming an unreadable file is passed
/// through as is.
pub fn expand_response_files(cmdline: impl Iterator<Item = OsString>) -> Vec<OsString> {
    let mut expanded = Vec::new();

    let mut args =
        VecDeque::from_iter(cmdline.map(|arg| argfile::Argument::parse(arg, argfile::PREFIX)));

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack = Vec::new();
    while !args.is_empty() || !stack.is_empty() {
        let Some(arg) = args.pop_front() else {
            args = stack.pop().unwrap_or_default();
            continue;
        };

        match arg {
            argfile::Argument::PassThrough(arg) => {
                expanded.push(arg);
            }
            argfile::Argument::Path(path) => {
                if !visited.insert(path.clone()) {
                    continue;
                }

                let Ok(content) = std::fs::read_to_string(&path) else {
                    args.push_front(argfile::Argument::PassThrough(
                        format!("@{}", path.to_string_lossy()).into(),
                    ));
                    continue;
                };

                stack.push(std::mem::take(&mut args));
                args.extend(argfile::parse_fromfile(&content, argfile::PREFIX));
            }
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::{CommandFactory, Parser};

    use super::{CliArgs, expand_response_files};
    use crate::logging::ColorOption;

    #[test]
    fn verify_command() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["dumplib", "ntdll-exports.txt", "ntdll.dll"])
            .expect("arguments should parse");

        assert_eq!(args.listing.as_os_str(), "ntdll-exports.txt");
        assert_eq!(args.library_name, "ntdll.dll");
        assert_eq!(args.output_dir, None);
        assert_eq!(args.preamble_lines, dumpbin::DUMPBIN_PREAMBLE_LINES);
        assert_eq!(args.vcvars, dumplib::generate::DEFAULT_VCVARS);
        assert_eq!(args.color, ColorOption::Auto);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn options() {
        let args = CliArgs::try_parse_from([
            "dumplib",
            "-vv",
            "--color-diagnostics",
            "--preamble-lines=3",
            "-o",
            "out",
            "exports.txt",
            "kernel32.dll",
        ])
        .expect("arguments should parse");

        assert_eq!(args.verbose, 2);
        assert_eq!(args.color, ColorOption::Always);

        let options = args.into_options();
        assert_eq!(options.preamble_lines, 3);
        assert_eq!(options.output_dir.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(options.library_name, "kernel32.dll");
    }

    #[test]
    fn color_values() {
        let args = CliArgs::try_parse_from([
            "dumplib",
            "--color-diagnostics=never",
            "exports.txt",
            "kernel32.dll",
        ])
        .expect("arguments should parse");
        assert_eq!(args.color, ColorOption::Never);

        CliArgs::try_parse_from([
            "dumplib",
            "--color-diagnostics=sometimes",
            "exports.txt",
            "kernel32.dll",
        ])
        .expect_err("invalid color value should be rejected");
    }

    #[test]
    fn missing_dllname() {
        CliArgs::try_parse_from(["dumplib", "exports.txt"])
            .expect_err("missing DLLNAME should be rejected");
    }

    #[test]
    fn passthrough_unreadable_response_file() {
        let cmdline = ["dumplib", "@does/not/exist.rsp", "ntdll.dll"]
            .into_iter()
            .map(OsString::from);

        assert_eq!(
            expand_response_files(cmdline),
            ["dumplib", "@does/not/exist.rsp", "ntdll.dll"].map(OsString::from)
        );
    }
}
