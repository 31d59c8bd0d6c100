//! Type expression parsing.

use crate::model::{ReferenceKind, Type};
use crate::parser::cursor::TokenCursor;
use crate::parser::normalize::normalize_type;
use crate::parser::token::TokenKind;

/// Parse a type expression at the cursor.
///
/// Never fails: when no type can be read the returned type has an empty
/// name and the caller decides whether that is an error. An annotation
/// keyword in type position is returned as a one-word type so that the
/// method parser can treat it as a function attribute.
pub fn parse_type(cursor: &mut TokenCursor) -> Type {
    let mut ty = Type::default();
    let mut has_sign = false;
    let mut is_void = false;

    while cursor.test(TokenKind::Signed) || cursor.test(TokenKind::Unsigned) {
        ty.name.push_str(cursor.lexem());
        ty.name.push(' ');
        has_sign = true;
    }
    ty.first_token = Some(cursor.peek());

    loop {
        cursor.skip_cxx_attributes();
        match cursor.next() {
            TokenKind::Struct | TokenKind::Class | TokenKind::Enum => cursor.prev(),
            kind @ (TokenKind::Const | TokenKind::Volatile) => {
                ty.name.push_str(cursor.lexem());
                ty.name.push(' ');
                if kind == TokenKind::Volatile {
                    ty.is_volatile = true;
                }
                continue;
            }
            TokenKind::QMocCompat
            | TokenKind::QInvokable
            | TokenKind::QScriptable
            | TokenKind::QSignals
            | TokenKind::QSlots
            | TokenKind::QSignal
            | TokenKind::QSlot => {
                ty.name.push_str(cursor.lexem());
                return seal(ty);
            }
            TokenKind::Eof => return seal(ty),
            _ => cursor.prev(),
        }
        break;
    }

    cursor.skip_cxx_attributes();
    let _ = cursor.test(TokenKind::Enum) || cursor.test(TokenKind::Class) || cursor.test(TokenKind::Struct);

    loop {
        cursor.skip_cxx_attributes();
        match cursor.next() {
            // `void slot(unsigned value)`: the identifier is the parameter name
            TokenKind::Identifier if has_sign => cursor.prev(),
            TokenKind::Identifier | TokenKind::Char | TokenKind::Short | TokenKind::Int | TokenKind::Long => {
                ty.name.push_str(cursor.lexem());
                // keep `long long`, `short int`, `long int` and `long double` together
                if cursor.test(TokenKind::Long) || cursor.test(TokenKind::Int) || cursor.test(TokenKind::Double) {
                    ty.name.push(' ');
                    cursor.prev();
                    continue;
                }
            }
            kind @ (TokenKind::Float | TokenKind::Double | TokenKind::Void | TokenKind::Bool | TokenKind::Auto) => {
                ty.name.push_str(cursor.lexem());
                is_void |= kind == TokenKind::Void;
            }
            TokenKind::Eof => return seal(ty),
            _ => cursor.prev(),
        }

        if cursor.test(TokenKind::LAngle) {
            if ty.name.is_empty() {
                // '<' cannot start a type
                return seal(ty);
            }
            let arguments = cursor.lexem_until(TokenKind::RAngle);
            ty.name.push_str(&arguments);
        }
        if cursor.test(TokenKind::Scope) {
            ty.name.push_str(cursor.lexem());
            ty.is_scoped = true;
        } else {
            break;
        }
    }

    while cursor.test(TokenKind::Const)
        || cursor.test(TokenKind::Volatile)
        || cursor.test(TokenKind::Signed)
        || cursor.test(TokenKind::Unsigned)
        || cursor.test(TokenKind::Star)
        || cursor.test(TokenKind::Amp)
        || cursor.test(TokenKind::AndAnd)
    {
        ty.name.push(' ');
        ty.name.push_str(cursor.lexem());
        match cursor.lookback(0) {
            TokenKind::Amp => ty.reference = ReferenceKind::Reference,
            TokenKind::AndAnd => ty.reference = ReferenceKind::RValueReference,
            TokenKind::Star => ty.reference = ReferenceKind::Pointer,
            _ => {}
        }
    }

    ty.raw_name = ty.name.clone();
    // `const void` and `void const` are plain `void`
    if is_void && ty.reference == ReferenceKind::NoReference {
        ty.name = "void".to_string();
    }
    ty.normalized = normalize_type(&ty.name);
    ty
}

fn seal(mut ty: Type) -> Type {
    ty.raw_name = ty.name.clone();
    ty.normalized = normalize_type(&ty.name);
    ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parse(source: &str) -> (Type, TokenCursor) {
        let mut cursor = TokenCursor::new(Lexer::new(source, "t.h").tokenize().unwrap(), "t.h");
        let ty = parse_type(&mut cursor);
        (ty, cursor)
    }

    #[test]
    fn test_simple_and_reference() {
        let (ty, _) = parse("const QString &name");
        assert_eq!(ty.name, "const QString &");
        assert_eq!(ty.normalized, "QString");
        assert_eq!(ty.reference, ReferenceKind::Reference);
        assert_eq!(ty.first_token, Some(TokenKind::Const));
    }

    #[test]
    fn test_multi_word_builtins() {
        assert_eq!(parse("unsigned long long x").0.name, "unsigned long long");
        assert_eq!(parse("long double").0.name, "long double");
        assert_eq!(parse("short int y").0.normalized, "short");
    }

    #[test]
    fn test_unsigned_followed_by_name() {
        let (ty, mut cursor) = parse("unsigned value )");
        assert_eq!(ty.normalized, "uint");
        assert!(cursor.test(TokenKind::Identifier));
        assert_eq!(cursor.lexem(), "value");
    }

    #[test]
    fn test_templates_and_scopes() {
        let (ty, _) = parse("QMap<QString, QList<int>> *m");
        assert_eq!(ty.reference, ReferenceKind::Pointer);
        assert_eq!(ty.normalized, "QMap<QString,QList<int>>*");

        let (ty, _) = parse("Qt::Orientation o");
        assert!(ty.is_scoped);
        assert_eq!(ty.name, "Qt::Orientation");
    }

    #[test]
    fn test_const_void_is_void() {
        let (ty, _) = parse("const void");
        assert_eq!(ty.name, "void");
        assert_eq!(ty.raw_name, "const void");
        assert!(ty.is_void());
    }

    #[test]
    fn test_elaborated_keyword_dropped() {
        let (ty, _) = parse("enum Qt::Key k");
        assert_eq!(ty.name, "Qt::Key");
    }

    #[test]
    fn test_annotation_in_type_position() {
        let (ty, _) = parse("Q_INVOKABLE void f()");
        assert_eq!(ty.name, "Q_INVOKABLE");
        assert_eq!(ty.first_token, Some(TokenKind::QInvokable));
    }

    #[test]
    fn test_empty_type() {
        let (ty, _) = parse("( x )");
        assert!(ty.name.is_empty());
    }
}
