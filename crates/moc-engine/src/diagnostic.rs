//! Diagnostic infrastructure for warnings, notes and errors.
//!
//! The parser never prints. Warnings and notes are collected as
//! [`Diagnostic`] values next to the parse result; fatal errors travel as
//! `Err`. Front ends render them either in the classic one-line
//! `file:line:1: warning: message` form or, when the lexed source is at hand,
//! through codespan-reporting with a source snippet.

use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::WriteColor;

use crate::parser::token::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A located message produced while compiling one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Logical file name (follows line markers)
    pub file: String,
    /// 1-based logical line, 0 when the message is not tied to a line
    pub line: u32,
    /// Byte range in the lexed text, when known
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(severity: Severity, file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            line,
            span: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, file, line, message)
    }

    /// Create a note diagnostic
    pub fn note(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, file, line, message)
    }

    /// Create an error diagnostic
    pub fn error(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, file, line, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Convert to a codespan diagnostic labelled in `file_id`.
    pub fn to_codespan(&self, file_id: usize) -> CsDiagnostic<usize> {
        let severity = match self.severity {
            Severity::Note => CsSeverity::Note,
            Severity::Warning => CsSeverity::Warning,
            Severity::Error => CsSeverity::Error,
        };
        let mut diag = CsDiagnostic::new(severity).with_message(&self.message);
        match self.span {
            Some(span) => {
                diag = diag.with_labels(vec![Label::primary(file_id, span.start..span.end)]);
            }
            None if self.line > 0 => {
                diag = diag.with_notes(vec![format!("at {}:{}", self.file, self.line)]);
            }
            None => {}
        }
        diag
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}:1: {}: {}", self.file, self.line, self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.file, self.severity, self.message)
        }
    }
}

/// Render diagnostics against the lexed source with codespan-reporting.
pub fn emit(
    writer: &mut dyn WriteColor,
    file_name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
) -> Result<(), codespan_reporting::files::Error> {
    let mut files = SimpleFiles::new();
    let file_id = files.add(file_name.to_string(), source.to_string());
    let config = term::Config::default();
    for diagnostic in diagnostics {
        term::emit(writer, &config, &files, &diagnostic.to_codespan(file_id))?;
    }
    Ok(())
}
