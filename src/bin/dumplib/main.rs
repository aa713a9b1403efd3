use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use dumplib::ErrorKind;

use cli::CliArgs;

mod cli;
mod logging;

/// Exit status when the listing does not contain any exports.
const EXIT_NO_EXPORTS: u8 = 2;

/// cli entrypoint
fn main() -> ExitCode {
    let cmdline = cli::expand_response_files(std::env::args_os());

    if cmdline.len() <= 1 {
        let _ = CliArgs::command().print_help();
        return ExitCode::SUCCESS;
    }

    let args = match CliArgs::try_parse_from(&cmdline) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    if let Err(e) = logging::init(args.verbose, args.color) {
        eprintln!("{}: could not set up logging: {e}", env!("CARGO_BIN_NAME"));
        return ExitCode::FAILURE;
    }

    if args.verbose >= 1 {
        cli::log_cmdline(&cmdline);
    }

    match dumplib::run(&args.into_options()) {
        Ok(summary) => {
            log::debug!(
                "{} exports, {} skipped rows, {} forward libraries",
                summary.exports,
                summary.skipped,
                summary.forward_libraries.len()
            );
            log::info!("you can modify the .cpp/.def files now to remove unwanted exports");
            log::info!(
                "when finished, edit and run {} to generate the import library",
                summary.build_script.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            match e.kind() {
                ErrorKind::NoExports => ExitCode::from(EXIT_NO_EXPORTS),
                ErrorKind::Fatal => ExitCode::FAILURE,
            }
        }
    }
}
