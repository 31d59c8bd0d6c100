//! Member function parsing: signal and slot sections, speculative method
//! recognition in class bodies, argument lists and default-argument clones.

use super::annotations::parse_revision;
use super::cursor::TokenCursor;
use super::error::ParseResult;
use super::normalize::normalize_type;
use super::ty::parse_type;
use super::Parser;
use crate::model::{Access, ArgumentDef, ClassDef, FunctionDef, MethodKind, ReferenceKind, Type};
use crate::parser::token::TokenKind;

// ============================================================================
// Modifiers and attributes
// ============================================================================

fn test_function_modifiers(cursor: &mut TokenCursor, def: &mut FunctionDef) -> bool {
    if cursor.test(TokenKind::Explicit) || cursor.test(TokenKind::Inline) {
        return true;
    }
    if cursor.test(TokenKind::Static) {
        def.is_static = true;
        return true;
    }
    if cursor.test(TokenKind::Virtual) {
        def.is_virtual = true;
        return true;
    }
    false
}

/// Apply a function attribute keyword to `def`. Returns false for any
/// other token kind.
fn apply_function_attribute(kind: TokenKind, def: &mut FunctionDef) -> bool {
    match kind {
        TokenKind::QMocCompat => def.is_compat = true,
        TokenKind::QInvokable => def.is_invokable = true,
        TokenKind::QSignal => def.is_signal = true,
        TokenKind::QSlot => def.is_slot = true,
        TokenKind::QScriptable => {
            def.is_invokable = true;
            def.is_scriptable = true;
        }
        _ => return false,
    }
    true
}

fn test_function_attribute(cursor: &mut TokenCursor, def: &mut FunctionDef) -> bool {
    if apply_function_attribute(cursor.peek(), def) {
        cursor.next();
        return true;
    }
    false
}

fn test_function_revision(cursor: &mut TokenCursor, def: &mut FunctionDef) -> ParseResult<bool> {
    if cursor.test(TokenKind::QRevision) {
        def.revision = parse_revision(cursor)?;
        return Ok(true);
    }
    Ok(false)
}

/// Skip leading modifiers, attributes and `Q_REVISION`, recording them.
fn skip_leading_modifiers(cursor: &mut TokenCursor, def: &mut FunctionDef) -> ParseResult<()> {
    loop {
        if test_function_modifiers(cursor, def)
            || cursor.skip_cxx_attributes()
            || test_function_attribute(cursor, def)
            || test_function_revision(cursor, def)?
        {
            continue;
        }
        return Ok(());
    }
}

/// Read `tag* return-type name` up to the opening parenthesis, leaving the
/// name in the returned type. Tokens before the return type that are not
/// attributes become the tag.
fn parse_tags_and_name(cursor: &mut TokenCursor, def: &mut FunctionDef, in_section: bool) -> ParseResult<Type> {
    let mut temp = parse_type(cursor);
    while !temp.name.is_empty() && cursor.peek() != TokenKind::LParen {
        let first = def.ty.first_token.unwrap_or(TokenKind::Eof);
        if apply_function_attribute(first, def) {
            // attribute after a tag
        } else if in_section && matches!(first, TokenKind::QSignals | TokenKind::QSlots) {
            return Err(cursor.parse_error());
        } else {
            if !def.tag.is_empty() {
                def.tag.push(' ');
            }
            def.tag.push_str(&def.ty.name);
        }
        def.ty = temp;
        temp = parse_type(cursor);
    }
    Ok(temp)
}

/// Reference return types cannot travel through `void **`; they become
/// `void`, keeping the written spelling in `raw_name`.
fn downgrade_reference_return(def: &mut FunctionDef) {
    if def.ty.reference == ReferenceKind::Reference {
        let raw_name = std::mem::take(&mut def.ty.raw_name);
        let first_token = def.ty.first_token;
        def.ty = Type::new("void");
        def.ty.raw_name = raw_name;
        def.ty.first_token = first_token;
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// Parse an argument list after the opening parenthesis, stopping in front
/// of the closing one.
pub fn parse_arguments(cursor: &mut TokenCursor, def: &mut FunctionDef) {
    while cursor.has_next() {
        let ty = parse_type(cursor);
        if ty.is_void() {
            break;
        }
        let mut arg = ArgumentDef {
            ty,
            ..Default::default()
        };
        if cursor.test(TokenKind::Identifier) {
            arg.name = cursor.lexem().to_string();
        }
        while cursor.test(TokenKind::LBracket) {
            let extent = cursor.lexem_until(TokenKind::RBracket);
            arg.right_type.push_str(&extent);
        }
        if cursor.test(TokenKind::Const) || cursor.test(TokenKind::Volatile) {
            arg.right_type.push(' ');
            arg.right_type.push_str(cursor.lexem());
        }
        arg.normalized_type = normalize_type(&format!("{} {}", arg.ty.name, arg.right_type));
        arg.type_name_for_cast = format!("std::add_pointer_t<{}>", arg.normalized_type);
        if cursor.test(TokenKind::Eq) {
            arg.is_default = true;
        }
        def.arguments.push(arg);
        if !cursor.until(TokenKind::Comma) {
            break;
        }
    }

    if def.arguments.last().is_some_and(|a| a.normalized_type == "QPrivateSignal") {
        def.arguments.pop();
        def.is_private_signal = true;
    }
    if def.arguments.len() == 1 && def.arguments[0].normalized_type == "QMethodRawArguments" {
        def.arguments.pop();
        def.is_raw_slot = true;
    }
}

/// Push `function` and one cloned overload per trailing default argument.
pub fn add_with_clones(list: &mut Vec<FunctionDef>, mut function: FunctionDef) {
    list.push(function.clone());
    while function.arguments.last().is_some_and(|a| a.is_default) {
        function.was_cloned = true;
        function.arguments.pop();
        list.push(function.clone());
    }
}

// ============================================================================
// Speculative method parsing
// ============================================================================

/// Try to read a member function declaration in a class body.
///
/// Returns `Ok(None)` when the tokens are not a function declaration; the
/// cursor position is then unspecified and the caller rewinds.
pub fn try_parse_method(parser: &mut Parser<'_>, class: &ClassDef, access: Access) -> ParseResult<Option<FunctionDef>> {
    let mut def = FunctionDef {
        access,
        line: parser.cursor.peek_line(),
        ..Default::default()
    };
    skip_leading_modifiers(&mut parser.cursor, &mut def)?;

    let tilde = parser.cursor.test(TokenKind::Tilde);
    def.ty = parse_type(&mut parser.cursor);
    if def.ty.name.is_empty() {
        return Ok(None);
    }

    let scoped_name;
    if parser.cursor.test(TokenKind::LParen) {
        if def.ty.name != class.classname {
            // missing return type
            return Ok(None);
        }
        def.name = std::mem::take(&mut def.ty.name);
        scoped_name = def.ty.is_scoped;
        def.is_destructor = tilde;
        def.is_constructor = !tilde;
        def.kind = if tilde { MethodKind::Destructor } else { MethodKind::Constructor };
        def.ty = Type::default();
    } else {
        if def.is_slot || def.is_signal || def.is_invokable {
            while test_function_modifiers(&mut parser.cursor, &mut def) {}
        }
        let name = parse_tags_and_name(&mut parser.cursor, &mut def, false)?;
        if !parser.cursor.test(TokenKind::LParen) {
            return Ok(None);
        }
        def.name = name.name;
        scoped_name = name.is_scoped;
    }

    downgrade_reference_return(&mut def);
    def.normalized_type = def.ty.normalized.clone();

    if !parser.cursor.test(TokenKind::RParen) {
        parse_arguments(&mut parser.cursor, &mut def);
        if !parser.cursor.test(TokenKind::RParen) {
            return Ok(None);
        }
    }
    def.is_const = parser.cursor.test(TokenKind::Const);

    if scoped_name && (def.is_signal || def.is_slot || def.is_invokable) {
        parser.warning(format!(
            "parsemaybe: Function declaration {} contains extra qualification. Ignoring as signal or slot.",
            def.name
        ));
        return Ok(None);
    }

    // skip trailing specifiers and an inline body
    while parser.cursor.test(TokenKind::Identifier) {}
    if parser.cursor.test(TokenKind::LBrace) {
        def.inline_code = true;
        parser.cursor.until(TokenKind::RBrace);
    }

    if def.is_signal {
        def.kind = MethodKind::Signal;
    } else if def.is_slot {
        def.kind = MethodKind::Slot;
    }
    Ok(Some(def))
}

// ============================================================================
// Signal and slot sections
// ============================================================================

/// Parse one declaration inside a `signals:` / `slots:` section or a
/// `Q_PRIVATE_SLOT` macro.
///
/// Returns false when the declaration must be ignored (qualified name).
pub fn parse_function(parser: &mut Parser<'_>, def: &mut FunctionDef, in_macro: bool) -> ParseResult<bool> {
    def.is_virtual = false;
    def.is_static = false;
    def.line = parser.cursor.peek_line();
    skip_leading_modifiers(&mut parser.cursor, def)?;

    let template_function = parser.cursor.peek() == TokenKind::Template;
    def.ty = parse_type(&mut parser.cursor);
    if def.ty.name.is_empty() {
        if template_function {
            return Err(parser.cursor.error("Template function as signal or slot"));
        }
        return Err(parser.cursor.parse_error());
    }

    // modifiers may follow a tag
    while test_function_modifiers(&mut parser.cursor, def) {}
    let name = parse_tags_and_name(&mut parser.cursor, def, true)?;
    if !parser.cursor.test(TokenKind::LParen) {
        parser.cursor.next();
        return Err(parser.cursor.error("Not a signal or slot declaration"));
    }
    def.name = name.name;
    let scoped_name = name.is_scoped;

    if !parser.cursor.test(TokenKind::RParen) {
        parse_arguments(&mut parser.cursor, def);
        parser.cursor.next_expect(TokenKind::RParen)?;
    }

    // compiler specific decorations around `const`
    while parser.cursor.test(TokenKind::Identifier) {}
    def.is_const = parser.cursor.test(TokenKind::Const);
    while parser.cursor.test(TokenKind::Identifier) {}

    if in_macro {
        parser.cursor.next_expect(TokenKind::RParen)?;
        parser.cursor.prev();
    } else {
        if parser.cursor.test(TokenKind::Throw) {
            parser.cursor.next_expect(TokenKind::LParen)?;
            parser.cursor.until(TokenKind::RParen);
        }

        if def.ty.name == "auto" && parser.cursor.test(TokenKind::Arrow) {
            def.ty = parse_type(&mut parser.cursor);
        }

        if parser.cursor.test(TokenKind::Semicolon) {
            // declaration only
        } else if parser.cursor.test(TokenKind::LBrace) {
            def.inline_code = true;
            parser.cursor.until(TokenKind::RBrace);
        } else if parser.cursor.test(TokenKind::Eq) {
            def.is_abstract = true;
            parser.cursor.until(TokenKind::Semicolon);
        } else if parser.cursor.skip_cxx_attributes() {
            parser.cursor.until(TokenKind::Semicolon);
        } else {
            parser.cursor.next();
            return Err(parser.cursor.parse_error());
        }
    }

    if scoped_name {
        parser.warning(format!(
            "Function declaration {} contains extra qualification. Ignoring as signal or slot.",
            def.name
        ));
        return Ok(false);
    }

    if def.ty.name == "auto" {
        return Err(parser.cursor.error(
            "Function declared with auto as return type but missing trailing return type. Return type deduction is not supported.",
        ));
    }

    downgrade_reference_return(def);
    def.normalized_type = def.ty.normalized.clone();
    Ok(true)
}

/// Optional `Q_REVISION(...)` before a section's colon.
fn parse_section_head(cursor: &mut TokenCursor) -> ParseResult<Option<i32>> {
    let revision = if cursor.test(TokenKind::QRevision) {
        Some(parse_revision(cursor)?)
    } else {
        None
    };
    cursor.next_expect(TokenKind::Colon)?;
    Ok(revision)
}

/// Advance to the next declaration of a section. Returns false when the
/// section ends.
fn next_section_member(parser: &mut Parser<'_>, class: &ClassDef, section: &str) -> ParseResult<bool> {
    while parser.in_class(class) && parser.cursor.has_next() {
        match parser.cursor.next() {
            TokenKind::Public
            | TokenKind::Protected
            | TokenKind::Private
            | TokenKind::QSignals
            | TokenKind::QSlots => {
                parser.cursor.prev();
                return Ok(false);
            }
            TokenKind::Semicolon => continue,
            TokenKind::Friend => {
                parser.cursor.until(TokenKind::Semicolon);
                continue;
            }
            TokenKind::Using => {
                return Err(parser
                    .cursor
                    .error(format!("'using' directive not supported in '{section}' section")));
            }
            _ => {
                parser.cursor.prev();
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Parse a `signals:` section.
pub fn parse_signals(parser: &mut Parser<'_>, class: &mut ClassDef) -> ParseResult<()> {
    let default_revision = parse_section_head(&mut parser.cursor)?;

    while next_section_member(parser, class, "signals")? {
        let mut def = FunctionDef {
            access: Access::Public,
            kind: MethodKind::Signal,
            is_signal: true,
            ..Default::default()
        };
        if !parse_function(parser, &mut def, false)? {
            continue;
        }
        if def.is_virtual {
            parser.warning("Signals cannot be declared virtual");
        }
        if def.inline_code {
            return Err(parser.cursor.error("Not a signal declaration"));
        }
        apply_section_revision(class, &mut def, default_revision);
        add_with_clones(&mut class.signal_list, def);
    }
    Ok(())
}

/// Parse a `slots:` section under the given access.
pub fn parse_slots(parser: &mut Parser<'_>, class: &mut ClassDef, access: Access) -> ParseResult<()> {
    let default_revision = parse_section_head(&mut parser.cursor)?;

    while next_section_member(parser, class, "slots")? {
        let mut def = FunctionDef {
            access,
            kind: MethodKind::Slot,
            is_slot: true,
            ..Default::default()
        };
        if !parse_function(parser, &mut def, false)? {
            continue;
        }
        apply_section_revision(class, &mut def, default_revision);
        add_with_clones(&mut class.slot_list, def);
    }
    Ok(())
}

fn apply_section_revision(class: &mut ClassDef, def: &mut FunctionDef, default_revision: Option<i32>) {
    if def.revision > 0 {
        class.revisioned_methods += 1;
    } else if let Some(revision) = default_revision {
        def.revision = revision;
        class.revisioned_methods += 1;
    }
}

/// `Q_PRIVATE_SLOT(d_func(), void slot(int))`
pub fn parse_slot_in_private(parser: &mut Parser<'_>, class: &mut ClassDef, access: Access) -> ParseResult<()> {
    parser.cursor.next_expect(TokenKind::LParen)?;
    let mut def = FunctionDef {
        access,
        kind: MethodKind::Slot,
        is_slot: true,
        ..Default::default()
    };
    parser.cursor.next_expect(TokenKind::Identifier)?;
    def.in_private_class = parser.cursor.lexem().to_string();
    if parser.cursor.test(TokenKind::LParen) {
        parser.cursor.next_expect(TokenKind::RParen)?;
        def.in_private_class.push_str("()");
    }
    parser.cursor.next_expect(TokenKind::Comma)?;

    if !parse_function(parser, &mut def, true)? {
        parser.cursor.next_expect(TokenKind::RParen)?;
        return Ok(());
    }
    parser.cursor.next_expect(TokenKind::RParen)?;
    if def.revision > 0 {
        class.revisioned_methods += 1;
    }
    add_with_clones(&mut class.slot_list, def);
    Ok(())
}
