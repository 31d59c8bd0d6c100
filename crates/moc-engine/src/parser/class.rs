//! Class heads and class bodies.

use super::annotations::{
    parse_class_info, parse_enum, parse_enum_or_flag, parse_flag, parse_interfaces, parse_moc_include,
    parse_plugin_data, skip_export_macro,
};
use super::error::ParseResult;
use super::function::{add_with_clones, parse_signals, parse_slot_in_private, parse_slots, try_parse_method};
use super::property::{check_properties, parse_private_property, parse_property, PropertyMode};
use super::ty::parse_type;
use super::Parser;
use crate::model::{Access, ClassDef, DeclKind, SuperClass};
use crate::parser::token::TokenKind;

fn is_final_like(lexeme: &str) -> bool {
    matches!(lexeme, "final" | "sealed" | "Q_DECL_FINAL")
}

// ============================================================================
// Class head
// ============================================================================

/// Parse a class head after `class`/`struct` up to and including the
/// opening brace, then locate the closing brace and rewind to just inside
/// the body.
///
/// Returns false for forward declarations, variable declarations and
/// elaborated type specifiers.
pub fn parse_class_head(parser: &mut Parser<'_>, def: &mut ClassDef) -> ParseResult<bool> {
    // a class definition reaches `:` or `{` before `;`
    let mut offset = 0;
    loop {
        match parser.cursor.peek_at(offset) {
            TokenKind::Colon | TokenKind::LBrace => break,
            TokenKind::Semicolon | TokenKind::RAngle | TokenKind::Eof => return Ok(false),
            _ => offset += 1,
        }
    }

    let cursor = &mut parser.cursor;
    def.line = cursor.peek_line();
    cursor.skip_cxx_attributes();
    if !cursor.test(TokenKind::Identifier) {
        return Ok(false);
    }
    let mut name = cursor.lexem().to_string();

    // `class EXPORT Name` and `class EXPORT(args) Name`
    if cursor.test(TokenKind::LParen) {
        cursor.until(TokenKind::RParen);
        if !cursor.test(TokenKind::Identifier) {
            return Ok(false);
        }
        name = cursor.lexem().to_string();
    } else if cursor.test(TokenKind::Identifier) {
        if is_final_like(cursor.lexem()) {
            cursor.prev();
        } else {
            name = cursor.lexem().to_string();
        }
    }

    def.qualified.push_str(&name);
    while cursor.test(TokenKind::Scope) {
        def.qualified.push_str("::");
        if cursor.test(TokenKind::Identifier) {
            name = cursor.lexem().to_string();
            def.qualified.push_str(&name);
        }
    }
    def.classname = name;

    if cursor.test(TokenKind::Identifier) && !is_final_like(cursor.lexem()) {
        return Ok(false);
    }

    if cursor.test(TokenKind::Colon) {
        loop {
            cursor.test(TokenKind::Virtual);
            let access = if cursor.test(TokenKind::Private) {
                Access::Private
            } else if cursor.test(TokenKind::Protected) {
                Access::Protected
            } else {
                cursor.test(TokenKind::Public);
                Access::Public
            };
            cursor.test(TokenKind::Virtual);

            let ty = parse_type(cursor);
            // `class Foo : BAR(Baz)`
            if cursor.test(TokenKind::LParen) {
                cursor.until(TokenKind::RParen);
            } else {
                let qualified = parser.known.qualified(&ty.name).unwrap_or(&ty.name).to_string();
                def.super_class_list.push(SuperClass {
                    name: ty.name,
                    qualified,
                    access,
                });
            }
            if !cursor.test(TokenKind::Comma) {
                break;
            }
        }

        // subclasses of gadgets are gadgets
        if let Some(first) = def.super_class_list.first() {
            if parser.known.is_gadget(&first.name) {
                parser.known.add_gadget(&def.classname, &def.qualified);
            }
        }
    }

    if !cursor.test(TokenKind::LBrace) {
        return Ok(false);
    }
    def.begin = cursor.index() - 1;
    let found = cursor.until(TokenKind::RBrace);
    def.end = cursor.index();
    cursor.set_index(def.begin + 1);
    Ok(found)
}

// ============================================================================
// Class bodies
// ============================================================================

/// Register a class from an included file if it carries `Q_OBJECT` or
/// `Q_GADGET`. Its body is consumed.
pub fn scan_included_class(parser: &mut Parser<'_>) -> ParseResult<()> {
    let mut def = ClassDef::default();
    if !parse_class_head(parser, &mut def)? {
        return Ok(());
    }
    while parser.in_class(&def) && parser.cursor.has_next() {
        match parser.cursor.next() {
            TokenKind::QObject => def.has_q_object = true,
            TokenKind::QGadgetExport => {
                parser.cursor.until(TokenKind::RParen);
                def.has_q_gadget = true;
            }
            TokenKind::QGadget => def.has_q_gadget = true,
            _ => {}
        }
    }
    if !def.has_q_object && !def.has_q_gadget {
        return Ok(());
    }

    parser.prepend_namespaces(&mut def);
    if def.has_q_object {
        parser.known.add_qobject_class(&def.classname, &def.qualified);
    } else {
        parser.known.add_gadget(&def.classname, &def.qualified);
    }
    Ok(())
}

/// Skip the body of a class nested in a class with metadata. Annotations
/// inside it are errors.
fn skip_nested_class(parser: &mut Parser<'_>, outer: &ClassDef) -> ParseResult<()> {
    let mut nested = ClassDef::default();
    if !parse_class_head(parser, &mut nested)? {
        return Ok(());
    }
    while parser.in_class(&nested) && parser.in_class(outer) {
        if parser.cursor.next().is_annotation() {
            return Err(parser
                .cursor
                .error("Meta object features not supported for nested classes"));
        }
    }
    Ok(())
}

fn access_specifier(parser: &mut Parser<'_>, access: Access) -> ParseResult<Access> {
    if parser.cursor.test(TokenKind::QSignals) {
        return Err(parser.cursor.error("Signals cannot have access specifier"));
    }
    Ok(access)
}

/// Route a speculatively parsed member function to the class lists.
fn add_member_function(def: &mut ClassDef, function: crate::model::FunctionDef, access: Access) {
    if function.is_constructor {
        if access == Access::Public && function.is_invokable {
            add_with_clones(&mut def.constructor_list, function);
        }
        return;
    }
    if function.is_destructor {
        return;
    }

    if access == Access::Public {
        def.public_list.push(function.clone());
    }
    let revisioned = function.revision > 0;
    if function.is_slot {
        add_with_clones(&mut def.slot_list, function);
    } else if function.is_signal {
        add_with_clones(&mut def.signal_list, function);
    } else if function.is_invokable {
        add_with_clones(&mut def.method_list, function);
    } else {
        return;
    }
    if revisioned {
        def.revisioned_methods += 1;
    }
}

/// Parse a class in the main file after `class`/`struct`.
///
/// Returns the finished declaration, or `None` when the class needs no
/// metadata.
pub fn parse_class(parser: &mut Parser<'_>, is_struct: bool) -> ParseResult<Option<ClassDef>> {
    let mut def = ClassDef::default();
    if !parse_class_head(parser, &mut def)? {
        return Ok(None);
    }
    parser.prepend_namespaces(&mut def);

    let mut access = if is_struct { Access::Public } else { Access::Private };
    while parser.in_class(&def) && parser.cursor.has_next() {
        match parser.cursor.next() {
            TokenKind::Private => access = access_specifier(parser, Access::Private)?,
            TokenKind::Protected => access = access_specifier(parser, Access::Protected)?,
            TokenKind::Public => access = access_specifier(parser, Access::Public)?,
            TokenKind::Class | TokenKind::Struct => skip_nested_class(parser, &def)?,
            TokenKind::QSignals => parse_signals(parser, &mut def)?,
            TokenKind::QSlots => match parser.cursor.lookback(1) {
                TokenKind::Public | TokenKind::Protected | TokenKind::Private => {
                    parse_slots(parser, &mut def, access)?
                }
                _ => return Err(parser.cursor.error("Missing access specifier for slots")),
            },
            TokenKind::QObject => {
                def.has_q_object = true;
                if parser.template_class {
                    return Err(parser.cursor.error("Template classes not supported by Q_OBJECT"));
                }
                if def.classname != "Qt" && def.classname != "QObject" && def.super_class_list.is_empty() {
                    return Err(parser
                        .cursor
                        .error("Class contains Q_OBJECT macro but does not inherit from QObject"));
                }
            }
            kind @ (TokenKind::QGadget | TokenKind::QGadgetExport) => {
                if kind == TokenKind::QGadgetExport {
                    skip_export_macro(&mut parser.cursor)?;
                }
                def.has_q_gadget = true;
                if parser.template_class {
                    return Err(parser.cursor.error("Template classes not supported by Q_GADGET"));
                }
            }
            TokenKind::QProperty => parse_property(parser, &mut def, PropertyMode::Named)?,
            TokenKind::QAnonymousProperty => parse_property(parser, &mut def, PropertyMode::Anonymous)?,
            TokenKind::QPrivateProperty => parse_private_property(parser, &mut def, PropertyMode::Named)?,
            TokenKind::QAnonymousPrivateProperty => {
                parse_private_property(parser, &mut def, PropertyMode::Anonymous)?
            }
            TokenKind::QPluginMetadata => parse_plugin_data(parser, &mut def)?,
            TokenKind::QEnums | TokenKind::QEnum => parse_enum_or_flag(&mut parser.cursor, &mut def, false)?,
            TokenKind::QEnumNs => {
                return Err(parser
                    .cursor
                    .error("Q_ENUM_NS can't be used in a Q_OBJECT/Q_GADGET, use Q_ENUM instead"));
            }
            TokenKind::QFlags | TokenKind::QFlag => parse_enum_or_flag(&mut parser.cursor, &mut def, true)?,
            TokenKind::QFlagNs => {
                return Err(parser
                    .cursor
                    .error("Q_FLAG_NS can't be used in a Q_OBJECT/Q_GADGET, use Q_FLAG instead"));
            }
            TokenKind::QDeclareFlags => parse_flag(&mut parser.cursor, &mut def)?,
            TokenKind::QClassInfo => parse_class_info(&mut parser.cursor, &mut def)?,
            TokenKind::QMocInclude => parse_moc_include(parser)?,
            TokenKind::QInterfaces => parse_interfaces(parser, &mut def)?,
            TokenKind::QPrivateSlot => parse_slot_in_private(parser, &mut def, access)?,
            TokenKind::Enum => {
                if let Some(enum_def) = parse_enum(&mut parser.cursor)? {
                    def.enum_list.push(enum_def);
                }
            }
            TokenKind::Semicolon | TokenKind::Colon => {}
            _ => {
                let rewind = parser.cursor.index();
                parser.cursor.prev();
                match try_parse_method(parser, &def, access)? {
                    Some(function) => add_member_function(&mut def, function, access),
                    None => parser.cursor.set_index(rewind),
                }
            }
        }
    }
    parser.cursor.next_expect(TokenKind::RBrace)?;

    if !def.has_q_object
        && !def.has_q_gadget
        && def.signal_list.is_empty()
        && def.slot_list.is_empty()
        && def.property_list.is_empty()
        && def.enum_declarations.is_empty()
    {
        return Ok(None);
    }
    if !def.has_q_object && !def.has_q_gadget {
        return Err(parser.cursor.error("Class declaration lacks Q_OBJECT macro."));
    }

    def.kind = if def.has_q_object { DeclKind::Object } else { DeclKind::Gadget };
    if def.plugin_data.is_declared() {
        def.plugin_data.meta_args = parser.options.meta_args.clone();
    }
    if def.has_q_object && !def.super_class_list.is_empty() {
        check_super_classes(parser, &def);
    }
    check_properties(parser, &mut def);

    if def.has_q_object {
        parser.known.add_qobject_class(&def.classname, &def.qualified);
    } else {
        parser.known.add_gadget(&def.classname, &def.qualified);
    }
    Ok(Some(def))
}

/// Warn about a second QObject base and about interface bases missing
/// from `Q_INTERFACES`.
fn check_super_classes(parser: &mut Parser<'_>, def: &ClassDef) {
    let first = &def.super_class_list[0].name;
    if !parser.known.is_qobject_class(first) {
        return;
    }

    let is_registered_interface = |name: &str| {
        def.interface_list
            .iter()
            .any(|chain| chain.first().is_some_and(|i| i.class_name == name))
    };

    for super_class in &def.super_class_list[1..] {
        let name = &super_class.name;
        if parser.known.is_qobject_class(name) {
            parser.warning(format!(
                "Class {} inherits from two QObject subclasses {} and {}. This is not supported!",
                def.classname, first, name
            ));
        }
        if parser.known.interface_ids.contains_key(name) && !is_registered_interface(name) {
            parser.warning(format!(
                "Class {} implements the interface {} but does not list it in Q_INTERFACES. qobject_cast to {} will not work!",
                def.classname, name, name
            ));
        }
    }
}
