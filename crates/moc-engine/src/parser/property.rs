//! `Q_PROPERTY` parsing and the per-class property checks that run once
//! the class body is complete.

use super::annotations::parse_revision;
use super::error::ParseResult;
use super::normalize::normalize_type;
use super::ty::parse_type;
use super::Parser;
use crate::model::{ClassDef, PropertyDef, Specification};
use crate::parser::token::{Token, TokenKind};
use rustc_hash::FxHashSet;

/// Whether the property declaration starts with a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMode {
    Named,
    Anonymous,
}

/// `Q_PROPERTY(type name ...)` / `QT_ANONYMOUS_PROPERTY(type ...)`
pub fn parse_property(parser: &mut Parser<'_>, class: &mut ClassDef, mode: PropertyMode) -> ParseResult<()> {
    parser.cursor.next_expect(TokenKind::LParen)?;
    let mut def = PropertyDef::default();
    create_property_def(parser, &mut def, class.property_list.len(), mode)?;
    parser.cursor.next_expect(TokenKind::RParen)?;
    class.property_list.push(def);
    Ok(())
}

/// `Q_PRIVATE_PROPERTY(d_func(), type name ...)`
pub fn parse_private_property(parser: &mut Parser<'_>, class: &mut ClassDef, mode: PropertyMode) -> ParseResult<()> {
    parser.cursor.next_expect(TokenKind::LParen)?;
    let mut def = PropertyDef::default();
    parser.cursor.next_expect(TokenKind::Identifier)?;
    def.in_private_class = parser.cursor.lexem().to_string();
    while parser.cursor.test(TokenKind::Scope) {
        def.in_private_class.push_str("::");
        parser.cursor.next_expect(TokenKind::Identifier)?;
        def.in_private_class.push_str(parser.cursor.lexem());
    }
    if parser.cursor.test(TokenKind::LParen) {
        parser.cursor.next_expect(TokenKind::RParen)?;
        def.in_private_class.push_str("()");
    }
    parser.cursor.next_expect(TokenKind::Comma)?;

    create_property_def(parser, &mut def, class.property_list.len(), mode)?;
    parser.cursor.next_expect(TokenKind::RParen)?;
    class.property_list.push(def);
    Ok(())
}

fn create_property_def(
    parser: &mut Parser<'_>,
    def: &mut PropertyDef,
    relative_index: usize,
    mode: PropertyMode,
) -> ParseResult<()> {
    def.relative_index = relative_index;
    def.line = parser.cursor.peek_line();

    let ty = parse_type(&mut parser.cursor);
    if ty.name.is_empty() {
        parser.cursor.next();
        return Err(parser.cursor.parse_error());
    }
    def.designable = "true".into();
    def.scriptable = "true".into();
    def.stored = "true".into();
    def.user = "false".into();

    // Template arguments cannot be written inside the macro, so the
    // containers QVariant supports are spelled without them.
    let normalized = normalize_type(&ty.name);
    def.ty = match normalized.as_str() {
        "QMap" => "QMap<QString,QVariant>".to_string(),
        "QValueList" => "QValueList<QVariant>".to_string(),
        "LongLong" => "qlonglong".to_string(),
        "ULongLong" => "qulonglong".to_string(),
        _ => normalized,
    };

    if mode == PropertyMode::Named {
        parser.cursor.next();
        def.name = parser.cursor.lexem().to_string();
    }

    parse_property_attributes(parser, def)
}

fn attribute_error(parser: &Parser<'_>, attribute: &Token) -> super::error::ParseError {
    super::error::ParseError::new(
        parser.cursor.current_file(),
        attribute.line(),
        format!("Parse error at \"{}\"", attribute.lexeme),
    )
}

fn reject_function_value(parser: &Parser<'_>, value: &str, attribute: &str) -> ParseResult<()> {
    if value.ends_with(')') {
        return Err(parser.cursor.error(format!(
            "Providing a function for {attribute} in a property declaration is not be supported in Qt 6."
        )));
    }
    Ok(())
}

fn parse_property_attributes(parser: &mut Parser<'_>, def: &mut PropertyDef) -> ParseResult<()> {
    while parser.cursor.test(TokenKind::Identifier) {
        let attribute = parser.cursor.symbol().clone();
        let keyword = attribute.lexeme.as_str();
        let first = keyword.as_bytes().first().copied().unwrap_or(0);

        match (first, keyword) {
            (b'C', "CONSTANT") => {
                def.constant = true;
                continue;
            }
            (b'F', "FINAL") => {
                def.final_ = true;
                continue;
            }
            (b'N', "NAME") => {
                parser.cursor.next_expect(TokenKind::Identifier)?;
                def.name = parser.cursor.lexem().to_string();
                continue;
            }
            (b'R', "REQUIRED") => {
                def.required = true;
                continue;
            }
            (b'R', "REVISION") if parser.cursor.peek() == TokenKind::LParen => {
                def.revision = parse_revision(&mut parser.cursor)?;
                continue;
            }
            _ => {}
        }

        let mut value;
        let mut call = String::new();
        if parser.cursor.test(TokenKind::LParen) {
            let text = parser.cursor.lexem_until(TokenKind::RParen);
            value = text
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .unwrap_or(&text)
                .to_string();
        } else if parser.cursor.test(TokenKind::IntegerLiteral) {
            value = parser.cursor.lexem().to_string();
            if keyword != "REVISION" {
                return Err(attribute_error(parser, &attribute));
            }
        } else if parser.cursor.test(TokenKind::Default) {
            value = parser.cursor.lexem().to_string();
            if keyword != "READ" && keyword != "WRITE" {
                return Err(attribute_error(parser, &attribute));
            }
        } else {
            parser.cursor.next_expect(TokenKind::Identifier)?;
            value = parser.cursor.lexem().to_string();
            if parser.cursor.test(TokenKind::LParen) {
                call = parser.cursor.lexem_until(TokenKind::RParen);
            } else if value != "true" && value != "false" {
                call = "()".to_string();
            }
        }

        match (first, keyword) {
            (b'M', "MEMBER") => def.member = value,
            (b'R', "READ") => def.read = value,
            (b'R', "RESET") => def.reset = value,
            (b'R', "REVISION") => {
                def.revision = value
                    .parse::<i32>()
                    .ok()
                    .filter(|v| (0..255).contains(v))
                    .ok_or_else(|| attribute_error(parser, &attribute))?;
            }
            (b'S', "SCRIPTABLE") => {
                value.push_str(&call);
                reject_function_value(parser, &value, "SCRIPTABLE")?;
                def.scriptable = value;
            }
            (b'S', "STORED") => {
                value.push_str(&call);
                reject_function_value(parser, &value, "STORED")?;
                def.stored = value;
            }
            (b'W', "WRITE") => def.write = value,
            (b'B', "BINDABLE") => def.bind = value,
            (b'D', "DESIGNABLE") => {
                value.push_str(&call);
                reject_function_value(parser, &value, "DESIGNABLE")?;
                def.designable = value;
            }
            (b'N', "NOTIFY") => def.notify = value,
            (b'U', "USER") => {
                value.push_str(&call);
                reject_function_value(parser, &value, "USER")?;
                def.user = value;
            }
            _ => return Err(attribute_error(parser, &attribute)),
        }
    }

    resolve_attribute_conflicts(parser, def);
    Ok(())
}

fn resolve_attribute_conflicts(parser: &mut Parser<'_>, def: &mut PropertyDef) {
    if def.constant && !def.write.is_empty() {
        def.constant = false;
        parser.warning(format!(
            "Property declaration {} is both WRITEable and CONSTANT. CONSTANT will be ignored.",
            def.name
        ));
    }
    if def.constant && !def.notify.is_empty() {
        def.constant = false;
        parser.warning(format!(
            "Property declaration {} is both NOTIFYable and CONSTANT. CONSTANT will be ignored.",
            def.name
        ));
    }
    if def.constant && !def.bind.is_empty() {
        def.constant = false;
        parser.warning(format!(
            "Property declaration {} is both BINDable and CONSTANT. CONSTANT will be ignored.",
            def.name
        ));
    }
    if def.read == "default" && def.bind.is_empty() {
        def.read.clear();
        parser.warning(format!(
            "Property declaration {} is not BINDable but default-READable. READ will be ignored.",
            def.name
        ));
    }
    if def.write == "default" && def.bind.is_empty() {
        def.write.clear();
        parser.warning(format!(
            "Property declaration {} is not BINDable but default-WRITEable. WRITE will be ignored.",
            def.name
        ));
    }
}

// ============================================================================
// Post-class checks
// ============================================================================

/// Validate properties once the whole class is known: drop unusable ones,
/// pick getter specifications and resolve NOTIFY signals.
pub fn check_properties(parser: &mut Parser<'_>, class: &mut ClassDef) {
    let mut seen = FxHashSet::default();
    let mut kept = Vec::with_capacity(class.property_list.len());
    for p in std::mem::take(&mut class.property_list) {
        if !seen.insert(p.name.clone()) {
            parser.warning(format!(
                "The property '{}' is defined multiple times in class {}.",
                p.name, class.classname
            ));
        }
        if p.read.is_empty() && p.member.is_empty() && p.bind.is_empty() {
            parser.warning_at_line(
                p.line,
                format!(
                    "Property declaration {} has neither an associated QProperty<> member, nor a READ accessor function nor an associated MEMBER variable. The property will be invalid.",
                    p.name
                ),
            );
            if p.write.is_empty() {
                continue;
            }
        }
        kept.push(p);
    }
    class.property_list = kept;

    for p in &mut class.property_list {
        p.gspec = getter_specification(class.public_list.iter(), p);

        if p.notify.is_empty() {
            continue;
        }
        if let Some(index) = class.signal_list.iter().position(|f| f.name == p.notify) {
            p.notify_id = index as i32;
            continue;
        }
        let k = match class.non_class_signal_list.iter().position(|s| *s == p.notify) {
            Some(k) => k,
            None => {
                class.non_class_signal_list.push(p.notify.clone());
                class.non_class_signal_list.len() - 1
            }
        };
        p.notify_id = -2 - k as i32;
    }
}

/// How the READ accessor returns the value: a matching public const
/// zero-argument function decides between value, pointer and reference.
fn getter_specification<'f>(
    public: impl Iterator<Item = &'f crate::model::FunctionDef>,
    p: &PropertyDef,
) -> Specification {
    for f in public {
        if f.name != p.read || !f.is_const || !f.arguments.is_empty() {
            continue;
        }
        // reference returns were rewritten to void; judge by the spelling
        let mut returned = normalize_type(&f.ty.raw_name);
        let mut spec = Specification::ValueSpec;
        if p.ty == "QByteArray" && returned == "const char*" {
            returned = "QByteArray".to_string();
        }
        if let Some(rest) = returned.strip_prefix("const ") {
            returned = rest.to_string();
        }
        if p.ty != returned && returned.ends_with('*') {
            returned.pop();
            spec = Specification::PointerSpec;
        } else if f.ty.raw_name.trim_end().ends_with('&') {
            spec = Specification::ReferenceSpec;
        }
        if p.ty != returned {
            continue;
        }
        return spec;
    }
    Specification::ValueSpec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionDef, Type};

    fn getter(name: &str, ret: &str) -> FunctionDef {
        let mut ty = Type::new(ret);
        ty.raw_name = ret.to_string();
        FunctionDef {
            name: name.into(),
            ty,
            is_const: true,
            ..Default::default()
        }
    }

    fn property(ty: &str, read: &str) -> PropertyDef {
        PropertyDef {
            ty: ty.into(),
            read: read.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_getter_specifications() {
        let public = [getter("text", "const QString &"), getter("child", "QObject *"), getter("value", "int")];
        assert_eq!(
            getter_specification(public.iter(), &property("QString", "text")),
            Specification::ReferenceSpec
        );
        assert_eq!(
            getter_specification(public.iter(), &property("QObject", "child")),
            Specification::PointerSpec
        );
        assert_eq!(getter_specification(public.iter(), &property("int", "value")), Specification::ValueSpec);
        assert_eq!(getter_specification(public.iter(), &property("int", "missing")), Specification::ValueSpec);
    }

    #[test]
    fn test_non_const_getter_ignored() {
        let mut f = getter("child", "QObject *");
        f.is_const = false;
        assert_eq!(
            getter_specification([f].iter(), &property("QObject", "child")),
            Specification::ValueSpec
        );
    }
}
