//! Parse error type.

use thiserror::Error;

/// A fatal parse error. There is no recovery across declarations: the first
/// error aborts the run and no output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:1: error: {message}")]
pub struct ParseError {
    /// Logical file name at the point of failure (follows line markers)
    pub file: String,

    /// 1-based logical line
    pub line: u32,

    /// Human-readable error message
    pub message: String,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the parser.
pub type ParseResult<T> = Result<T, ParseError>;
