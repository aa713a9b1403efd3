//! Pipeline reading a listing and writing the generated artifacts.

use std::{
    ffi::OsStr,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use dumpbin::{ExportListing, ForwardLibraries, ListingParser};

use crate::{
    error::{Error, ErrorContext, ErrorKind, Result},
    fsutils,
    generate::{Artifact, BuildScript, DEFAULT_VCVARS, ModuleDefinition, StubSource},
};

/// Options for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Path to the `dumpbin /EXPORTS` output.
    pub listing: PathBuf,

    /// File name of the library being reconstructed (e.g. `ntdll.dll`).
    pub library_name: String,

    /// Directory for the artifacts. Defaults to the directory of the listing.
    pub output_dir: Option<PathBuf>,

    /// Number of header lines before the export table.
    pub preamble_lines: usize,

    /// `vcvars32.bat` called by the build script.
    pub vcvars: String,
}

impl Options {
    pub fn new(listing: impl Into<PathBuf>, library_name: impl Into<String>) -> Options {
        Self {
            listing: listing.into(),
            library_name: library_name.into(),
            output_dir: None,
            preamble_lines: dumpbin::DUMPBIN_PREAMBLE_LINES,
            vcvars: DEFAULT_VCVARS.to_string(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of exports written to the artifacts.
    pub exports: usize,

    /// Number of table rows that were dropped.
    pub skipped: usize,

    /// Libraries the build script links against.
    pub forward_libraries: ForwardLibraries,

    /// Path of the generated `.cpp` file.
    pub stub_source: PathBuf,

    /// Path of the generated `.def` file.
    pub module_definition: PathBuf,

    /// Path of the generated `.bat` file.
    pub build_script: PathBuf,
}

/// Parses the listing and writes the stub source, module definition and build
/// script next to it (or into the configured output directory).
pub fn run(options: &Options) -> Result<Summary> {
    let listing_path = fsutils::absolute_normalized_path(&options.listing)
        .with_context(|| format!("failed to resolve {}", options.listing.display()))?;

    let stem = listing_path
        .file_stem()
        .and_then(OsStr::to_str)
        .with_context(|| format!("{} is not a valid listing file name", listing_path.display()))?;

    let output_dir = match &options.output_dir {
        Some(dir) => fsutils::absolute_normalized_path(dir)
            .with_context(|| format!("failed to resolve {}", dir.display()))?,
        None => listing_path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("{} has no parent directory", listing_path.display()))?,
    };

    log::info!("reading dumpbin output from {}", listing_path.display());

    let mut forwards = ForwardLibraries::new();
    let listing = read_listing(&listing_path, options, &mut forwards)?;

    log::info!("parsed {} exports", listing.exports.len());
    if !listing.skipped.is_empty() {
        log::warn!(
            "skipped {} rows that could not be parsed",
            listing.skipped.len()
        );
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let stub_source = write_artifact(&output_dir, stem, &StubSource::new(&listing.exports))?;

    let module_definition = write_artifact(
        &output_dir,
        stem,
        &ModuleDefinition::new(&options.library_name, &listing.exports),
    )?;

    let build_script = write_artifact(
        &output_dir,
        stem,
        &BuildScript::new(&output_dir, stem, &options.library_name, &forwards)
            .vcvars(&options.vcvars),
    )?;

    Ok(Summary {
        exports: listing.exports.len(),
        skipped: listing.skipped.len(),
        forward_libraries: forwards,
        stub_source,
        module_definition,
        build_script,
    })
}

fn read_listing(
    path: &Path,
    options: &Options,
    forwards: &mut ForwardLibraries,
) -> Result<ExportListing> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {} for reading", path.display()))?;

    let parser = ListingParser::new(&options.library_name).preamble_lines(options.preamble_lines);

    match parser.parse_reader(BufReader::new(file), forwards) {
        Ok(listing) => Ok(listing),
        Err(dumpbin::Error::NoExports) => Err(Error::with_kind(
            ErrorKind::NoExports,
            format!(
                "no exports found in {}. Did you use the x86 version of dumpbin?",
                path.display()
            ),
        )),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn write_artifact<A: Artifact>(dir: &Path, stem: &str, artifact: &A) -> Result<PathBuf> {
    let path = fsutils::artifact_path(dir, stem, A::EXTENSION);
    log::info!("creating {}", path.display());

    let file = File::create(&path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;

    let mut writer = BufWriter::new(file);
    artifact
        .write_to(&mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}
