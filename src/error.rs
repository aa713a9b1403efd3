//! Error handling module.
//!
//! This is a trimmed down take on [anyhow](https://github.com/dtolnay/anyhow)
//! that additionally carries an [`ErrorKind`].
//!
//! Per-export problems never show up here. They are recovered inside the
//! listing parser and only reported as diagnostics. What is left are the
//! conditions that stop the run: unreadable input, unwritable artifacts and
//! a listing without any exports. The kind lets the binary pick an exit
//! status for the last one.

use private::Sealed;

/// Result type for the program
pub type Result<T> = std::result::Result<T, Error>;

/// Category of a fatal error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input could not be read or an output could not be written.
    #[default]
    Fatal,

    /// The listing did not produce a single export.
    ///
    /// Most often the listing was created with the 64-bit dumpbin or is not
    /// dumpbin output.
    NoExports,
}

/// Generic program error type.
///
/// Holds the error kind and a stack of messages. Messages are displayed in
/// LIFO order delimited by a `:`. New messages can be pushed on the stack
/// using the [`ErrorContext`] trait.
///
/// ```rs
/// File::open(path).with_context(|| format!("failed to open {} for reading", path.display()))?;
/// ```
/// Is displayed as
/// ```txt
/// dumplib: error: failed to open exports.txt for reading: No such file or directory (os error 2)
/// ```
#[derive(Debug)]
pub struct Error(Box<ErrorInner>);

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    messages: Vec<String>,
}

impl Error {
    pub fn msg(s: impl std::fmt::Display) -> Error {
        Self::with_kind(ErrorKind::Fatal, s)
    }

    pub fn with_kind(kind: ErrorKind, s: impl std::fmt::Display) -> Error {
        Self(Box::new(ErrorInner {
            kind,
            messages: vec![s.to_string()],
        }))
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::make_error!($msg))
    };
    ($fmt:expr, $($args:tt)*) => {
        return Err($crate::make_error!($fmt, $($args)*))
    };
}

#[macro_export]
macro_rules! make_error {
    ($msg:literal $(,)?) => {
        $crate::error::Error::msg(format!($msg))
    };
    ($fmt:expr, $($args:tt)*) => {
        $crate::error::Error::msg(format!($fmt, $($args)*))
    };
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut it = self.0.messages.iter().rev();
        let Some(e) = it.next() else {
            return Ok(());
        };

        f.write_str(e)?;
        it.try_for_each(|e| {
            f.write_str(": ")?;
            f.write_str(e)
        })
    }
}

impl<E: std::error::Error> From<E> for Error {
    fn from(value: E) -> Self {
        Self::msg(value)
    }
}

pub trait ErrorContext<T>: Sealed {
    fn context(self, context: impl std::fmt::Display) -> std::result::Result<T, Error>;
    fn with_context<C: std::fmt::Display>(
        self,
        f: impl FnOnce() -> C,
    ) -> std::result::Result<T, Error>;
}

impl<T, E: Into<Error>> Sealed for std::result::Result<T, E> {}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl std::fmt::Display) -> std::result::Result<T, Error> {
        self.map_err(|e| {
            let mut e: Error = e.into();
            e.0.messages.push(context.to_string());
            e
        })
    }

    fn with_context<C: std::fmt::Display>(
        self,
        f: impl FnOnce() -> C,
    ) -> std::result::Result<T, Error> {
        self.map_err(|e| {
            let mut e: Error = e.into();
            e.0.messages.push(f().to_string());
            e
        })
    }
}

impl<T> Sealed for Option<T> {}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, context: impl std::fmt::Display) -> std::result::Result<T, Error> {
        self.ok_or_else(|| Error::msg(context))
    }

    fn with_context<C: std::fmt::Display>(
        self,
        f: impl FnOnce() -> C,
    ) -> std::result::Result<T, Error> {
        self.ok_or_else(|| Error::msg(f()))
    }
}

mod private {
    pub trait Sealed {}
}
