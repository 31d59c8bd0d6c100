//! Meta-Object Compiler Engine
//!
//! This crate reads preprocessed C++ headers and generates the reflection
//! metadata the Qt meta-object runtime consumes:
//! - **Parser**: Lexer, token cursor and declaration parser (`parser` module)
//! - **Model**: Classes, gadgets and namespaces found in the input (`model` module)
//! - **Generator**: String table, metadata array and dispatch code (`generator` module)
//! - **Side outputs**: Plugin metadata blob, JSON document and dependency listing
//!
//! # Example
//!
//! ```rust,ignore
//! use moc_engine::{compile_source, FsLoader, KnownTypes, MocOptions};
//!
//! let source = r#"
//!     class Counter : public QObject {
//!         Q_OBJECT
//!         Q_PROPERTY(int value READ value NOTIFY valueChanged)
//!     public:
//!         int value() const;
//!     signals:
//!         void valueChanged(int);
//!     };
//! "#;
//!
//! let mut known = KnownTypes::new();
//! let output = compile_source(source, "counter.h", &mut known, &MocOptions::default(), &FsLoader)?;
//! println!("{}", output.code);
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Lexer, token cursor and declaration parser
pub mod parser;

/// Declaration model shared by parser and generator
pub mod model;

/// Cross-file type knowledge
pub mod known;

/// Insertion-ordered string table
pub mod interner;

/// Generated source: metadata tables and dispatch code
pub mod generator;

// ============================================================================
// Side outputs and ambient modules
// ============================================================================

pub mod cbor;
pub mod compile;
pub mod config;
pub mod deps;
pub mod diagnostic;
pub mod json;

// ============================================================================
// Re-exports
// ============================================================================

pub use compile::{compile_file, compile_source, compile_tokens, MocError, MocOutput};
pub use config::{ConfigError, MocConfig, MocOptions};
pub use diagnostic::{Diagnostic, Severity};
pub use generator::{Generator, OUTPUT_REVISION};
pub use interner::StringTable;
pub use known::KnownTypes;
pub use model::{ClassDef, DeclKind, EnumDef, FunctionDef, PropertyDef};
pub use parser::{FsLoader, LexError, Lexer, MetaDataLoader, ParseError, ParseOutput, Parser};
