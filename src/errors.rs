//! Errors and error-related utilities.

use std::{error, fmt, result};

/// The result type used throughout this library.
pub type Result<T> = result::Result<T, Box<dyn error::Error>>;

/// Invalid input.
#[derive(Debug)]
pub struct InvalidInput(pub String);

/// Invalid command line argument.
#[derive(Debug)]
pub struct InvalidArgument(pub String);

/// Malformed aligner output or treebank file.
///
/// A half-parsed record cannot be trusted, so these are always fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number, if known.
    pub line: Option<usize>,
    pub message: String,
}

/// The alignment and the treebank disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyError(pub String);

/// A sentence cannot be rendered as CoNLL-U.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeError(pub String);

impl FormatError {
    pub fn new(message: String) -> FormatError {
        FormatError {
            line: None,
            message,
        }
    }

    /// Attach a line number unless one is already known.
    pub fn at_line(self, line: usize) -> FormatError {
        FormatError {
            line: self.line.or(Some(line)),
            message: self.message,
        }
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid input: {}", self.0)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "format error on line {}: {}", line, self.message),
            None => write!(f, "format error: {}", self.message),
        }
    }
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "inconsistent data: {}", self.0)
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot serialize: {}", self.0)
    }
}

impl error::Error for InvalidInput {}

impl error::Error for InvalidArgument {}

impl error::Error for FormatError {}

impl error::Error for ConsistencyError {}

impl error::Error for SerializeError {}
