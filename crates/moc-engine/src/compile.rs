//! Compilation pipeline.
//!
//! Lex → Parse → Generate, plus the JSON side document when requested.
//! Cross-file knowledge lives in the caller's [`KnownTypes`], so running
//! several inputs through the same table lets later files see the classes of
//! earlier ones.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::config::{ConfigError, MocOptions};
use crate::diagnostic::{Diagnostic, Severity};
use crate::generator::write_file;
use crate::json::JsonDocument;
use crate::known::KnownTypes;
use crate::model::ClassDef;
use crate::parser::{FsLoader, LexError, Lexer, MetaDataLoader, ParseError, Parser, Token};

/// Errors that stop a run. No output is produced for the input.
#[derive(Debug, Error)]
pub enum MocError {
    #[error("{}", format_lex_errors(.0))]
    Lex(Vec<LexError>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write generated code")]
    Format(#[from] fmt::Error),

    #[error("Failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<LexError>> for MocError {
    fn from(errors: Vec<LexError>) -> Self {
        MocError::Lex(errors)
    }
}

impl MocError {
    /// Located fatal errors as error diagnostics, for rendering next to the
    /// warnings of the same run. Errors without a location yield nothing.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            MocError::Lex(errors) => errors
                .iter()
                .map(|e| Diagnostic::error(e.file(), e.line(), e.message()))
                .collect(),
            MocError::Parse(err) => vec![Diagnostic::error(err.file.as_str(), err.line, err.message.as_str())],
            _ => Vec::new(),
        }
    }
}

fn format_lex_errors(errors: &[LexError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Everything produced for one input.
#[derive(Debug, Clone, Default)]
pub struct MocOutput {
    /// Generated source, empty when the input has nothing to reflect
    pub code: String,
    /// JSON side document, when `output_json` is set
    pub json: Option<String>,
    pub classes: Vec<ClassDef>,
    /// Warnings and notes left after the `no_warnings`/`no_notes` filters
    pub diagnostics: Vec<Diagnostic>,
    /// Input, entered include files and plugin metadata files
    pub dependencies: Vec<String>,
}

impl MocOutput {
    pub fn has_output(&self) -> bool {
        !self.classes.is_empty()
    }
}

fn keep_diagnostic(options: &MocOptions, diagnostic: &Diagnostic) -> bool {
    match diagnostic.severity {
        Severity::Warning => !options.no_warnings,
        Severity::Note => !options.no_notes,
        Severity::Error => true,
    }
}

/// Compile an already tokenized input.
pub fn compile_tokens(
    tokens: Vec<Token>,
    input_name: &str,
    known: &mut KnownTypes,
    options: &MocOptions,
    loader: &dyn MetaDataLoader,
) -> Result<MocOutput, MocError> {
    let parsed = Parser::new(tokens, input_name, known, options, loader).parse()?;

    let mut diagnostics = parsed.diagnostics;
    let mut code = String::new();
    if parsed.classes.is_empty() {
        diagnostics.push(Diagnostic::note(
            input_name,
            0,
            "No relevant classes found. No output generated.",
        ));
    } else {
        write_file(&mut code, input_name, &parsed.classes, known, options, &parsed.moc_includes)?;
    }

    let json = if options.output_json {
        Some(JsonDocument::new(input_name, &parsed.classes).to_string_pretty()?)
    } else {
        None
    };

    diagnostics.retain(|d| keep_diagnostic(options, d));
    Ok(MocOutput {
        code,
        json,
        classes: parsed.classes,
        diagnostics,
        dependencies: parsed.dependencies,
    })
}

/// Compile preprocessed source text.
pub fn compile_source(
    source: &str,
    input_name: &str,
    known: &mut KnownTypes,
    options: &MocOptions,
    loader: &dyn MetaDataLoader,
) -> Result<MocOutput, MocError> {
    let tokens = Lexer::new(source, input_name).tokenize()?;
    compile_tokens(tokens, input_name, known, options, loader)
}

/// Read and compile a preprocessed file, loading plugin metadata from disk.
pub fn compile_file(path: &Path, known: &mut KnownTypes, options: &MocOptions) -> Result<MocOutput, MocError> {
    let source = std::fs::read_to_string(path)?;
    let input_name = path.to_string_lossy();
    compile_source(&source, &input_name, known, options, &FsLoader)
}
