use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use log::Level;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

struct CliLogger {
    max_level: Level,
    stdout: BufferWriter,
    stderr: BufferWriter,
}

impl CliLogger {
    fn write_record(&self, buffer: &mut Buffer, record: &log::Record) -> std::io::Result<()> {
        write!(buffer, "{}: ", env!("CARGO_BIN_NAME"))?;

        let (color, tag) = match record.level() {
            Level::Error => (Color::Red, "error:"),
            Level::Warn => (Color::Yellow, "warning:"),
            Level::Info => (Color::Green, "info:"),
            Level::Debug => (Color::White, "debug:"),
            Level::Trace => (Color::Blue, "trace:"),
        };

        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(buffer, "{tag}")?;
        buffer.reset()?;
        writeln!(buffer, " {}", record.args())
    }
}

impl log::Log for CliLogger {
    #[inline]
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata())
            || record.args().as_str().is_some_and(|args| args.is_empty())
        {
            return;
        }

        let writer = if record.level() <= Level::Warn {
            &self.stderr
        } else {
            &self.stdout
        };

        let mut buffer = writer.buffer();
        if self.write_record(&mut buffer, record).is_ok() {
            let _ = writer.print(&buffer);
        }
    }

    fn flush(&self) {}
}

/// Color options for the logger
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOption {
    /// Automatically use colors depending on the environment
    #[value(name = "auto")]
    #[default]
    Auto,

    /// Always use colors
    #[value(name = "always")]
    Always,

    /// Never use colors
    #[value(name = "never")]
    Never,
}

impl std::fmt::Display for ColorOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(v) = self.to_possible_value() {
            write!(f, "{}", v.get_name())?;
        }

        Ok(())
    }
}

impl From<ColorOption> for ColorChoice {
    fn from(value: ColorOption) -> Self {
        match value {
            ColorOption::Auto => ColorChoice::Auto,
            ColorOption::Always => ColorChoice::Always,
            ColorOption::Never => ColorChoice::Never,
        }
    }
}

/// Sets up logging for the cli.
///
/// Logs at the info level by default. Each `-v` raises the level by one.
pub fn init(verbose: u8, color: ColorOption) -> Result<(), log::SetLoggerError> {
    let color_choice = if color == ColorOption::Auto
        && (dumb_terminal() || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()))
    {
        ColorChoice::Never
    } else {
        color.into()
    };

    let stream_choice = |is_terminal: bool| {
        if color_choice == ColorChoice::Always || (color_choice != ColorChoice::Never && is_terminal)
        {
            color_choice
        } else {
            ColorChoice::Never
        }
    };

    let max_level = match verbose {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    };

    log::set_boxed_logger(Box::new(CliLogger {
        max_level,
        stdout: BufferWriter::stdout(stream_choice(std::io::stdout().is_terminal())),
        stderr: BufferWriter::stderr(stream_choice(std::io::stderr().is_terminal())),
    }))
    .map(|()| log::set_max_level(max_level.to_level_filter()))
}

/// Returns `true` if `TERM` is set to `dumb`.
fn dumb_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}
