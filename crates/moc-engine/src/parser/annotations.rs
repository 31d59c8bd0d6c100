//! Reflection annotations other than properties and methods: enums, enum
//! and flag markers, class info, interfaces, plugin metadata, revisions and
//! the top-level declaration macros.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::cursor::TokenCursor;
use super::error::ParseResult;
use super::normalize::normalize_type;
use super::ty::parse_type;
use super::Parser;
use crate::model::{ClassDef, ClassInfoDef, EnumDef, Interface};
use crate::parser::token::TokenKind;

// ============================================================================
// Revisions
// ============================================================================

fn revision_segment(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok().filter(|v| (0..255).contains(v))
}

/// Parse `(minor)` or `(major, minor)` after `Q_REVISION`.
///
/// A single number is stored as is; a version pair is encoded as
/// `(major << 8) | minor`.
pub fn parse_revision(cursor: &mut TokenCursor) -> ParseResult<i32> {
    cursor.next_expect(TokenKind::LParen)?;
    let text = cursor.lexem_until(TokenKind::RParen);
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(&text);

    let parts: Vec<&str> = inner.split(',').collect();
    match parts.as_slice() {
        [single] => revision_segment(single).ok_or_else(|| cursor.error("Invalid revision")),
        [major, minor] => {
            let major = revision_segment(major).ok_or_else(|| cursor.error("Invalid major version"))?;
            let minor = revision_segment(minor).ok_or_else(|| cursor.error("Invalid minor version"))?;
            Ok((major << 8) | minor)
        }
        _ => Err(cursor.error("Invalid revision")),
    }
}

// ============================================================================
// Enums
// ============================================================================

fn handle_include_marker(cursor: &mut TokenCursor) {
    if cursor.test(TokenKind::IncludeBegin) {
        let name = cursor.lexem().to_string();
        cursor.push_file(name);
    } else if cursor.test(TokenKind::IncludeEnd) {
        cursor.pop_file();
    }
}

/// Parse an enum body after the `enum` keyword.
///
/// Returns `Ok(None)` for forward declarations, anonymous enums and
/// anything else that is not an enum definition with a name.
pub fn parse_enum(cursor: &mut TokenCursor) -> ParseResult<Option<EnumDef>> {
    let mut def = EnumDef::default();
    let mut typedef_enum = false;

    if cursor.test(TokenKind::Class) || cursor.test(TokenKind::Struct) {
        def.is_enum_class = true;
    }

    if cursor.test(TokenKind::Identifier) {
        def.name = cursor.lexem().to_string();
    } else {
        // `typedef enum { ... } Name;`
        if cursor.lookback(1) != TokenKind::Typedef {
            return Ok(None);
        }
        typedef_enum = true;
    }

    if cursor.test(TokenKind::Colon) {
        def.ty = normalize_type(&parse_type(cursor).name);
    }
    if !cursor.test(TokenKind::LBrace) {
        return Ok(None);
    }

    loop {
        handle_include_marker(cursor);
        if cursor.peek() == TokenKind::RBrace {
            // trailing comma
            break;
        }
        cursor.next_expect(TokenKind::Identifier)?;
        def.values.push(cursor.lexem().to_string());
        handle_include_marker(cursor);
        cursor.skip_cxx_attributes();

        let more = if cursor.test(TokenKind::Eq) {
            cursor.until(TokenKind::Comma)
        } else {
            cursor.test(TokenKind::Comma)
        };
        if !more {
            break;
        }
    }
    cursor.next_expect(TokenKind::RBrace)?;

    if typedef_enum {
        if !cursor.test(TokenKind::Identifier) {
            return Ok(None);
        }
        def.name = cursor.lexem().to_string();
    }
    Ok(Some(def))
}

fn scoped_identifier(cursor: &mut TokenCursor) -> String {
    let mut name = cursor.lexem().to_string();
    while cursor.test(TokenKind::Scope) && cursor.test(TokenKind::Identifier) {
        name.push_str("::");
        name.push_str(cursor.lexem());
    }
    name
}

/// `Q_ENUM(E)`, `Q_FLAG(F)` and the plural and namespace forms.
pub fn parse_enum_or_flag(cursor: &mut TokenCursor, def: &mut ClassDef, is_flag: bool) -> ParseResult<()> {
    cursor.next_expect(TokenKind::LParen)?;
    while cursor.test(TokenKind::Identifier) {
        let name = scoped_identifier(cursor);
        def.enum_declarations.insert(name, is_flag);
    }
    cursor.next_expect(TokenKind::RParen)
}

/// `Q_DECLARE_FLAGS(Flags, Enum)`
pub fn parse_flag(cursor: &mut TokenCursor, def: &mut ClassDef) -> ParseResult<()> {
    cursor.next_expect(TokenKind::LParen)?;
    let mut flag_name = String::new();
    while cursor.test(TokenKind::Identifier) {
        flag_name = scoped_identifier(cursor);
    }
    cursor.next_expect(TokenKind::Comma)?;
    let mut enum_name = String::new();
    while cursor.test(TokenKind::Identifier) {
        enum_name = scoped_identifier(cursor);
    }
    def.flag_aliases.insert(enum_name, flag_name);
    cursor.next_expect(TokenKind::RParen)
}

// ============================================================================
// Class info and interfaces
// ============================================================================

/// `Q_CLASSINFO("name", "value")`
pub fn parse_class_info(cursor: &mut TokenCursor, def: &mut ClassDef) -> ParseResult<()> {
    cursor.next_expect(TokenKind::LParen)?;
    cursor.next_expect(TokenKind::StringLiteral)?;
    let name = cursor.string_value();
    cursor.next_expect(TokenKind::Comma)?;

    let value = if cursor.test(TokenKind::StringLiteral) {
        cursor.string_value()
    } else if cursor.test(TokenKind::QRevision) {
        parse_revision(cursor)?.to_string()
    } else {
        // Q_CLASSINFO("help", QT_TR_NOOP("text"))
        cursor.next_expect(TokenKind::Identifier)?;
        cursor.next_expect(TokenKind::LParen)?;
        cursor.next_expect(TokenKind::StringLiteral)?;
        let value = cursor.string_value();
        cursor.next_expect(TokenKind::RParen)?;
        value
    };
    cursor.next_expect(TokenKind::RParen)?;
    def.class_info_list.push(ClassInfoDef { name, value });
    Ok(())
}

fn qualified_name(cursor: &mut TokenCursor) -> ParseResult<String> {
    let mut name = cursor.lexem().to_string();
    while cursor.test(TokenKind::Scope) {
        name.push_str("::");
        cursor.next_expect(TokenKind::Identifier)?;
        name.push_str(cursor.lexem());
    }
    Ok(name)
}

/// `Q_INTERFACES(A B:C)`
pub fn parse_interfaces(parser: &mut Parser<'_>, def: &mut ClassDef) -> ParseResult<()> {
    let cursor = &mut parser.cursor;
    cursor.next_expect(TokenKind::LParen)?;
    while cursor.test(TokenKind::Identifier) {
        let mut chain = vec![qualified_name(cursor)?];
        while cursor.test(TokenKind::Colon) {
            cursor.next_expect(TokenKind::Identifier)?;
            chain.push(qualified_name(cursor)?);
        }

        let mut resolved = Vec::with_capacity(chain.len());
        for class_name in chain {
            let Some(interface_id) = parser.known.interface_ids.get(&class_name) else {
                return Err(cursor.error("Undefined interface"));
            };
            resolved.push(Interface {
                interface_id: interface_id.clone(),
                class_name,
            });
        }
        def.interface_list.push(resolved);
    }
    cursor.next_expect(TokenKind::RParen)
}

// ============================================================================
// Top-level declarations
// ============================================================================

/// `Q_DECLARE_INTERFACE(Name, "iid")`. The id is kept as written so that
/// a macro can stand in for the literal.
pub fn parse_declare_interface(parser: &mut Parser<'_>) -> ParseResult<()> {
    let cursor = &mut parser.cursor;
    cursor.next_expect(TokenKind::LParen)?;
    cursor.next_expect(TokenKind::Identifier)?;
    let interface = qualified_name(cursor)?;
    cursor.next_expect(TokenKind::Comma)?;
    if !cursor.test(TokenKind::StringLiteral) {
        cursor.next_expect(TokenKind::Identifier)?;
    }
    let iid = cursor.lexem().to_string();
    parser.known.interface_ids.insert(interface, iid);
    cursor.next_expect(TokenKind::RParen)
}

fn parenthesized_text(cursor: &mut TokenCursor) -> ParseResult<String> {
    cursor.next_expect(TokenKind::LParen)?;
    let text = cursor.lexem_until(TokenKind::RParen);
    Ok(text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(&text)
        .to_string())
}

/// `Q_DECLARE_METATYPE(Type)`
pub fn parse_declare_metatype(parser: &mut Parser<'_>) -> ParseResult<()> {
    let type_name = parenthesized_text(&mut parser.cursor)?;
    parser.known.metatypes.insert(normalize_type(&type_name));
    Ok(())
}

/// `Q_MOC_INCLUDE("header.h")`
pub fn parse_moc_include(parser: &mut Parser<'_>) -> ParseResult<()> {
    let include = parenthesized_text(&mut parser.cursor)?;
    parser.moc_includes.push(include);
    Ok(())
}

/// `Q_GADGET_EXPORT(MACRO)` / `Q_NAMESPACE_EXPORT(MACRO)`
pub fn skip_export_macro(cursor: &mut TokenCursor) -> ParseResult<()> {
    cursor.next_expect(TokenKind::LParen)?;
    while cursor.test(TokenKind::Identifier) {}
    cursor.next_expect(TokenKind::RParen)
}

// ============================================================================
// Plugin metadata
// ============================================================================

/// Source of `Q_PLUGIN_METADATA(FILE ...)` contents.
pub trait MetaDataLoader {
    /// Read the file at `path`. A missing file is reported with
    /// [`io::ErrorKind::NotFound`] so that the next search path is tried.
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Loads metadata files from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl MetaDataLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a file"));
        }
        std::fs::read_to_string(path)
    }
}

fn metadata_candidates(parser: &Parser<'_>, file: &str) -> Vec<PathBuf> {
    let current = Path::new(parser.cursor.current_file());
    let mut candidates = vec![current.parent().unwrap_or(Path::new("")).join(file)];
    candidates.extend(parser.options.include_paths.iter().map(|dir| dir.join(file)));
    candidates
}

/// `Q_PLUGIN_METADATA(IID "id" URI "uri" FILE "meta.json")`
pub fn parse_plugin_data(parser: &mut Parser<'_>, def: &mut ClassDef) -> ParseResult<()> {
    parser.cursor.next_expect(TokenKind::LParen)?;
    let mut meta_data = String::new();
    let mut file_lexeme = String::new();

    while parser.cursor.test(TokenKind::Identifier) {
        let key = parser.cursor.lexem().to_string();
        match key.as_str() {
            "IID" => {
                parser.cursor.next_expect(TokenKind::StringLiteral)?;
                def.plugin_data.iid = parser.cursor.string_value();
            }
            "URI" => {
                parser.cursor.next_expect(TokenKind::StringLiteral)?;
                def.plugin_data.uri = parser.cursor.string_value();
            }
            "FILE" => {
                parser.cursor.next_expect(TokenKind::StringLiteral)?;
                file_lexeme = parser.cursor.lexem().to_string();
                let file = parser.cursor.string_value();

                let mut found = None;
                for candidate in metadata_candidates(parser, &file) {
                    match parser.loader.load(&candidate) {
                        Ok(text) => {
                            found = Some((candidate, text));
                            break;
                        }
                        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                        Err(e) => {
                            return Err(parser.cursor.error(format!(
                                "Plugin Metadata file {file_lexeme} could not be opened: {e}"
                            )));
                        }
                    }
                }
                let Some((path, text)) = found else {
                    return Err(parser.cursor.error(format!(
                        "Plugin Metadata file {file_lexeme} does not exist. Declaration will be ignored"
                    )));
                };
                parser.add_dependency(path.display().to_string());
                meta_data = text;
            }
            _ => {}
        }
    }

    if !meta_data.trim().is_empty() {
        match serde_json::from_str::<Value>(&meta_data) {
            Ok(Value::Object(map)) => def.plugin_data.meta_data = map,
            _ => {
                parser.warning(format!(
                    "Plugin Metadata file {file_lexeme} does not contain a valid JSON object. Declaration will be ignored"
                ));
                def.plugin_data.iid.clear();
                def.plugin_data.uri.clear();
                parser.cursor.until(TokenKind::RParen);
                return Ok(());
            }
        }
    }

    parser.cursor.next_expect(TokenKind::RParen)
}
