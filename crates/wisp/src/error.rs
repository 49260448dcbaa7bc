use std::fmt;

use strum::{Display, EnumString};

use crate::location::SourceLocation;

/// The flat error taxonomy of the language.
///
/// Mirrors the original interpreter's `LanguageError` hierarchy one-for-one;
/// kept flat (no further subclassing) since nothing in this interpreter
/// inspects error kinds except the CLI's exit code and the test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ErrorKind {
    SyntaxError,
    TypeError,
    RuntimeError,
    OutOfRangeError,
    IOError,
    LanguageError,
}

/// A single error type for every failure mode in the interpreter.
///
/// Syntax-time errors (raised by the lexer or parser) carry a
/// [`SourceLocation`]; runtime errors (raised by the evaluator) do not,
/// matching the original interpreter's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), location: None }
    }

    pub fn at(kind: ErrorKind, location: SourceLocation, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), location: Some(location) }
    }

    pub fn syntax(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::at(ErrorKind::SyntaxError, location, message)
    }

    pub fn type_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::at(ErrorKind::TypeError, location, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }

    pub fn out_of_range(index: i64, len: usize) -> Self {
        Self::new(ErrorKind::OutOfRangeError, format!("Index {index} is out of range [ 0, {len} )"))
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IOError, message)
    }

    pub fn language(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LanguageError, message)
    }

    /// Wraps this error as having come from inside a native function call,
    /// prefixing the function's name per `spec.md` §7.
    ///
    /// Always becomes a `RuntimeError`, discarding whatever kind the native
    /// function's error carried — matching `Globals.hpp`'s
    /// `DECLARE_NATIVE_FUNCTION` wrapper, which catches any `std::exception`
    /// (including the `LanguageError` `assert` throws) and rethrows a fresh
    /// `RuntimeError`.
    pub fn in_native_fn(self, name: &str) -> Self {
        Self { kind: ErrorKind::RuntimeError, message: format!("{name}: {}", self.message), location: self.location }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{location}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
