//! Token definitions for preprocessed C++ input.
//!
//! The parser only needs a coarse view of C++: the keywords that can start or
//! shape a declaration, the closed set of reflection annotations, literals,
//! identifiers and punctuation. Everything else is an `Other` token whose
//! lexeme is kept verbatim.

use std::fmt;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifiers and literals
    Identifier,
    IntegerLiteral,
    FloatingLiteral,
    StringLiteral,
    CharacterLiteral,

    // C++ keywords
    Class,
    Struct,
    Union,
    Namespace,
    Enum,
    Public,
    Protected,
    Private,
    Virtual,
    Explicit,
    Inline,
    Static,
    Const,
    Volatile,
    Mutable,
    Signed,
    Unsigned,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    Bool,
    Auto,
    Template,
    Typedef,
    Typename,
    Friend,
    Using,
    Throw,
    Default,
    Operator,

    // Reflection annotations. Keep these together: `is_annotation` relies on
    // the order of the variants between `QObject` and `QMocInclude`.
    QObject,
    QGadget,
    QGadgetExport,
    QNamespace,
    QNamespaceExport,
    QProperty,
    QAnonymousProperty,
    QPrivateProperty,
    QAnonymousPrivateProperty,
    QPluginMetadata,
    QEnums,
    QEnum,
    QEnumNs,
    QFlags,
    QFlag,
    QFlagNs,
    QDeclareFlags,
    QDeclareInterface,
    QDeclareMetatype,
    QClassInfo,
    QInterfaces,
    QSignals,
    QSlots,
    QSignal,
    QSlot,
    QPrivateSlot,
    QMocCompat,
    QInvokable,
    QScriptable,
    QRevision,
    QMocInclude,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    /// `>>`, split into two closers by the cursor when counting angles.
    GtGt,
    Scope,
    Colon,
    Semicolon,
    Comma,
    Eq,
    Tilde,
    Star,
    Amp,
    AndAnd,
    Arrow,
    Dot,
    Ellipsis,
    /// Any other operator or stray character.
    Other,

    // Virtual tokens produced from GNU line markers
    IncludeBegin,
    IncludeEnd,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// True for the reflection annotation keywords.
    pub fn is_annotation(self) -> bool {
        (self as u16) >= (TokenKind::QObject as u16) && (self as u16) <= (TokenKind::QMocInclude as u16)
    }

    /// True for tokens that can start or continue a builtin type name.
    pub fn is_builtin_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Void
                | TokenKind::Bool
                | TokenKind::Auto
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatingLiteral => "floating literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharacterLiteral => "character literal",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of file",
            other => return write!(f, "{:?}", other),
        };
        f.write_str(text)
    }
}

/// Byte range and logical line of a token.
///
/// `line` is the line in the file named by the enclosing line marker, so it
/// is what diagnostics print. `start`/`end` index into the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32) -> Self {
        Self { start, end, line }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A token: kind, raw lexeme and location.
///
/// For `IncludeBegin` the lexeme is the name of the file being entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// Convenience constructor used by tests and synthetic token runs.
    pub fn at_line(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Self::new(kind, lexeme, Span::new(0, 0, line))
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_range() {
        assert!(TokenKind::QObject.is_annotation());
        assert!(TokenKind::QProperty.is_annotation());
        assert!(TokenKind::QMocInclude.is_annotation());
        assert!(!TokenKind::Operator.is_annotation());
        assert!(!TokenKind::LParen.is_annotation());
        assert!(!TokenKind::Identifier.is_annotation());
    }

    #[test]
    fn test_builtin_type_keywords() {
        assert!(TokenKind::Unsigned.is_builtin_type_keyword());
        assert!(TokenKind::Void.is_builtin_type_keyword());
        assert!(!TokenKind::Const.is_builtin_type_keyword());
    }
}
