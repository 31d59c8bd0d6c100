//! Lexer for preprocessed C++ headers.
//!
//! Uses logos for the bulk of tokenization. Comments, whitespace and
//! preprocessor directives are dropped, except GNU line markers
//! (`# 12 "file.h" 1`), which adjust the logical line number and turn into
//! `IncludeBegin` / `IncludeEnd` virtual tokens.

use crate::parser::token::{Span, Token, TokenKind};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// Converted to [`TokenKind`] once a token has been matched.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\x0b\x0c]+")]
#[logos(skip r"\\\r?\n")]
#[logos(skip r"//[^\n]*")]
enum LogosToken {
    #[token("/*", lex_block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*", lex_directive)]
    Directive,

    // Keywords
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("union")]
    Union,
    #[token("namespace")]
    Namespace,
    #[token("enum")]
    Enum,
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("virtual")]
    Virtual,
    #[token("explicit")]
    Explicit,
    #[token("inline")]
    Inline,
    #[token("static")]
    Static,
    #[token("const")]
    Const,
    #[token("volatile")]
    Volatile,
    #[token("mutable")]
    Mutable,
    #[token("signed")]
    Signed,
    #[token("unsigned")]
    Unsigned,
    #[token("char")]
    Char,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("void")]
    Void,
    #[token("bool")]
    Bool,
    #[token("auto")]
    Auto,
    #[token("template")]
    Template,
    #[token("typedef")]
    Typedef,
    #[token("typename")]
    Typename,
    #[token("friend")]
    Friend,
    #[token("using")]
    Using,
    #[token("throw")]
    Throw,
    #[token("default")]
    Default,
    #[token("operator")]
    Operator,

    // Reflection annotations
    #[token("Q_OBJECT")]
    QObject,
    #[token("Q_GADGET")]
    QGadget,
    #[token("Q_GADGET_EXPORT")]
    QGadgetExport,
    #[token("Q_NAMESPACE")]
    QNamespace,
    #[token("Q_NAMESPACE_EXPORT")]
    QNamespaceExport,
    #[token("Q_PROPERTY")]
    QProperty,
    #[token("QT_ANONYMOUS_PROPERTY")]
    QAnonymousProperty,
    #[token("Q_PRIVATE_PROPERTY")]
    QPrivateProperty,
    #[token("QT_ANONYMOUS_PRIVATE_PROPERTY")]
    QAnonymousPrivateProperty,
    #[token("Q_PLUGIN_METADATA")]
    QPluginMetadata,
    #[token("Q_ENUMS")]
    QEnums,
    #[token("Q_ENUM")]
    QEnum,
    #[token("Q_ENUM_NS")]
    QEnumNs,
    #[token("Q_FLAGS")]
    QFlags,
    #[token("Q_FLAG")]
    QFlag,
    #[token("Q_FLAG_NS")]
    QFlagNs,
    #[token("Q_DECLARE_FLAGS")]
    QDeclareFlags,
    #[token("Q_DECLARE_INTERFACE")]
    QDeclareInterface,
    #[token("Q_DECLARE_METATYPE")]
    QDeclareMetatype,
    #[token("Q_CLASSINFO")]
    QClassInfo,
    #[token("Q_INTERFACES")]
    QInterfaces,
    #[token("signals")]
    #[token("Q_SIGNALS")]
    QSignals,
    #[token("slots")]
    #[token("Q_SLOTS")]
    QSlots,
    #[token("Q_SIGNAL")]
    QSignal,
    #[token("Q_SLOT")]
    QSlot,
    #[token("Q_PRIVATE_SLOT")]
    QPrivateSlot,
    #[token("Q_MOC_COMPAT")]
    QMocCompat,
    #[token("Q_INVOKABLE")]
    QInvokable,
    #[token("Q_SCRIPTABLE")]
    QScriptable,
    #[token("Q_REVISION")]
    QRevision,
    #[token("Q_MOC_INCLUDE")]
    QMocInclude,

    // Identifiers and literals
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,

    #[regex(r"0[xX][0-9a-fA-F']+[uUlLzZ]*")]
    #[regex(r"0[bB][01']+[uUlLzZ]*")]
    #[regex(r"[0-9][0-9']*[uUlLzZ]*")]
    IntegerLiteral,

    #[regex(r"[0-9][0-9']*\.[0-9']*([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"\.[0-9][0-9']*([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"[0-9][0-9']*[eE][+-]?[0-9]+[fFlL]?")]
    FloatingLiteral,

    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\.)*""#)]
    StringLiteral,

    #[regex(r#"(u8|u|U|L)?R""#, lex_raw_string)]
    RawStringLiteral,

    #[regex(r"(u8|u|U|L)?'([^'\\\n]|\\.)*'")]
    CharacterLiteral,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token(">>")]
    GtGt,
    #[token("::")]
    Scope,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("~")]
    Tilde,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("&&")]
    AndAnd,
    #[token("->")]
    Arrow,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,

    #[token("<<")]
    #[token("<=")]
    #[token(">=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("<=>")]
    #[token("==")]
    #[token("!=")]
    #[token("!")]
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("^")]
    #[token("|")]
    #[token("||")]
    #[token("?")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("^=")]
    #[token("|=")]
    #[token("&=")]
    #[token("++")]
    #[token("--")]
    #[token("->*")]
    #[token(".*")]
    Other,
}

/// Skip to the end of a block comment. Returns false when it never closes.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// Extend a directive across backslash-continued lines.
fn lex_directive(lex: &mut logos::Lexer<LogosToken>) {
    while lex.slice().trim_end_matches('\r').ends_with('\\') {
        let remainder = lex.remainder();
        if remainder.is_empty() {
            break;
        }
        let end = remainder[1..].find('\n').map(|i| i + 1).unwrap_or(remainder.len());
        lex.bump(end);
    }
}

/// Consume `delim( ... )delim"` after the `R"` prefix.
fn lex_raw_string(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let remainder = lex.remainder();
    let Some(open) = remainder.find('(') else {
        return false;
    };
    let delimiter = &remainder[..open];
    if delimiter.len() > 16 || delimiter.contains(|c: char| c.is_whitespace() || c == '\\') {
        return false;
    }
    let terminator = format!("){}\"", delimiter);
    match remainder[open..].find(&terminator) {
        Some(close) => {
            lex.bump(open + close + terminator.len());
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("{file}:{line}:1: error: Unterminated string literal")]
    UnterminatedString { file: String, line: u32 },

    #[error("{file}:{line}:1: error: Unterminated character literal")]
    UnterminatedCharacter { file: String, line: u32 },

    #[error("{file}:{line}:1: error: Unterminated comment")]
    UnterminatedComment { file: String, line: u32 },
}

impl LexError {
    /// Logical line the error was reported on.
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnterminatedString { line, .. }
            | LexError::UnterminatedCharacter { line, .. }
            | LexError::UnterminatedComment { line, .. } => *line,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            LexError::UnterminatedString { file, .. }
            | LexError::UnterminatedCharacter { file, .. }
            | LexError::UnterminatedComment { file, .. } => file,
        }
    }

    /// The message without the location prefix.
    pub fn message(&self) -> &'static str {
        match self {
            LexError::UnterminatedString { .. } => "Unterminated string literal",
            LexError::UnterminatedCharacter { .. } => "Unterminated character literal",
            LexError::UnterminatedComment { .. } => "Unterminated comment",
        }
    }
}

/// Maps byte offsets to physical line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based physical line containing `offset`.
    fn line_of(&self, offset: usize) -> i64 {
        match self.starts.binary_search(&offset) {
            Ok(i) => i as i64 + 1,
            Err(i) => i as i64,
        }
    }
}

/// A parsed GNU line marker or `#line` directive.
#[derive(Debug, PartialEq)]
struct LineMarker {
    line: i64,
    file: Option<String>,
    enters: bool,
    leaves: bool,
}

fn parse_line_marker(directive: &str) -> Option<LineMarker> {
    let body = directive.strip_prefix('#')?.trim_start();
    let body = body.strip_prefix("line").map(str::trim_start).unwrap_or(body);
    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let line = body[..digits].parse().ok()?;
    let rest = body[digits..].trim_start();

    let (file, rest) = match rest.strip_prefix('"') {
        Some(quoted) => {
            let end = quoted.find('"')?;
            (Some(quoted[..end].to_string()), &quoted[end + 1..])
        }
        None => (None, rest),
    };
    let flags: Vec<&str> = rest.split_whitespace().collect();
    Some(LineMarker {
        line,
        file,
        enters: flags.contains(&"1"),
        leaves: flags.contains(&"2"),
    })
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    file_name: String,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file_name: impl Into<String>) -> Self {
        Self {
            source,
            file_name: file_name.into(),
            tokens: Vec::with_capacity(source.len() / 4),
            errors: Vec::new(),
        }
    }

    /// Tokenize the whole input. The returned vector always ends in `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<LexError>> {
        let lines = LineIndex::new(self.source);
        // logical line = physical line + line_offset
        let mut line_offset: i64 = 0;
        let mut files = vec![self.file_name.clone()];
        let mut lex = LogosToken::lexer(self.source);

        while let Some(result) = lex.next() {
            let range = lex.span();
            let slice = lex.slice();
            let physical = lines.line_of(range.start);
            let line = (physical + line_offset).max(1) as u32;
            let span = Span::new(range.start, range.end, line);

            let kind = match result {
                Ok(LogosToken::BlockComment) => continue,
                Ok(LogosToken::Directive) => {
                    if let Some(marker) = parse_line_marker(slice) {
                        line_offset = marker.line - (lines.line_of(range.end) + 1);
                        if marker.enters {
                            let name = marker.file.unwrap_or_default();
                            files.push(name.clone());
                            self.tokens.push(Token::new(TokenKind::IncludeBegin, name, span));
                        } else if marker.leaves {
                            if files.len() > 1 {
                                files.pop();
                            }
                            self.tokens.push(Token::new(TokenKind::IncludeEnd, "", span));
                        }
                    }
                    continue;
                }
                Ok(token) => convert(token),
                Err(()) => {
                    let current_file = files.last().cloned().unwrap_or_default();
                    if slice.starts_with("/*") {
                        self.errors.push(LexError::UnterminatedComment { file: current_file, line });
                        continue;
                    }
                    let quote = slice.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
                    if quote.starts_with('"') {
                        self.errors.push(LexError::UnterminatedString { file: current_file, line });
                        continue;
                    }
                    if quote.starts_with('\'') {
                        self.errors.push(LexError::UnterminatedCharacter { file: current_file, line });
                        continue;
                    }
                    TokenKind::Other
                }
            };
            self.tokens.push(Token::new(kind, slice, span));
        }

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let end = self.source.len();
        let last_line = (lines.line_of(end) + line_offset).max(1) as u32;
        self.tokens.push(Token::new(TokenKind::Eof, "", Span::new(end, end, last_line)));
        Ok(self.tokens)
    }
}

fn convert(token: LogosToken) -> TokenKind {
    match token {
        LogosToken::Class => TokenKind::Class,
        LogosToken::Struct => TokenKind::Struct,
        LogosToken::Union => TokenKind::Union,
        LogosToken::Namespace => TokenKind::Namespace,
        LogosToken::Enum => TokenKind::Enum,
        LogosToken::Public => TokenKind::Public,
        LogosToken::Protected => TokenKind::Protected,
        LogosToken::Private => TokenKind::Private,
        LogosToken::Virtual => TokenKind::Virtual,
        LogosToken::Explicit => TokenKind::Explicit,
        LogosToken::Inline => TokenKind::Inline,
        LogosToken::Static => TokenKind::Static,
        LogosToken::Const => TokenKind::Const,
        LogosToken::Volatile => TokenKind::Volatile,
        LogosToken::Mutable => TokenKind::Mutable,
        LogosToken::Signed => TokenKind::Signed,
        LogosToken::Unsigned => TokenKind::Unsigned,
        LogosToken::Char => TokenKind::Char,
        LogosToken::Short => TokenKind::Short,
        LogosToken::Int => TokenKind::Int,
        LogosToken::Long => TokenKind::Long,
        LogosToken::Float => TokenKind::Float,
        LogosToken::Double => TokenKind::Double,
        LogosToken::Void => TokenKind::Void,
        LogosToken::Bool => TokenKind::Bool,
        LogosToken::Auto => TokenKind::Auto,
        LogosToken::Template => TokenKind::Template,
        LogosToken::Typedef => TokenKind::Typedef,
        LogosToken::Typename => TokenKind::Typename,
        LogosToken::Friend => TokenKind::Friend,
        LogosToken::Using => TokenKind::Using,
        LogosToken::Throw => TokenKind::Throw,
        LogosToken::Default => TokenKind::Default,
        LogosToken::Operator => TokenKind::Operator,
        LogosToken::QObject => TokenKind::QObject,
        LogosToken::QGadget => TokenKind::QGadget,
        LogosToken::QGadgetExport => TokenKind::QGadgetExport,
        LogosToken::QNamespace => TokenKind::QNamespace,
        LogosToken::QNamespaceExport => TokenKind::QNamespaceExport,
        LogosToken::QProperty => TokenKind::QProperty,
        LogosToken::QAnonymousProperty => TokenKind::QAnonymousProperty,
        LogosToken::QPrivateProperty => TokenKind::QPrivateProperty,
        LogosToken::QAnonymousPrivateProperty => TokenKind::QAnonymousPrivateProperty,
        LogosToken::QPluginMetadata => TokenKind::QPluginMetadata,
        LogosToken::QEnums => TokenKind::QEnums,
        LogosToken::QEnum => TokenKind::QEnum,
        LogosToken::QEnumNs => TokenKind::QEnumNs,
        LogosToken::QFlags => TokenKind::QFlags,
        LogosToken::QFlag => TokenKind::QFlag,
        LogosToken::QFlagNs => TokenKind::QFlagNs,
        LogosToken::QDeclareFlags => TokenKind::QDeclareFlags,
        LogosToken::QDeclareInterface => TokenKind::QDeclareInterface,
        LogosToken::QDeclareMetatype => TokenKind::QDeclareMetatype,
        LogosToken::QClassInfo => TokenKind::QClassInfo,
        LogosToken::QInterfaces => TokenKind::QInterfaces,
        LogosToken::QSignals => TokenKind::QSignals,
        LogosToken::QSlots => TokenKind::QSlots,
        LogosToken::QSignal => TokenKind::QSignal,
        LogosToken::QSlot => TokenKind::QSlot,
        LogosToken::QPrivateSlot => TokenKind::QPrivateSlot,
        LogosToken::QMocCompat => TokenKind::QMocCompat,
        LogosToken::QInvokable => TokenKind::QInvokable,
        LogosToken::QScriptable => TokenKind::QScriptable,
        LogosToken::QRevision => TokenKind::QRevision,
        LogosToken::QMocInclude => TokenKind::QMocInclude,
        LogosToken::Identifier => TokenKind::Identifier,
        LogosToken::IntegerLiteral => TokenKind::IntegerLiteral,
        LogosToken::FloatingLiteral => TokenKind::FloatingLiteral,
        LogosToken::StringLiteral | LogosToken::RawStringLiteral => TokenKind::StringLiteral,
        LogosToken::CharacterLiteral => TokenKind::CharacterLiteral,
        LogosToken::LParen => TokenKind::LParen,
        LogosToken::RParen => TokenKind::RParen,
        LogosToken::LBracket => TokenKind::LBracket,
        LogosToken::RBracket => TokenKind::RBracket,
        LogosToken::LBrace => TokenKind::LBrace,
        LogosToken::RBrace => TokenKind::RBrace,
        LogosToken::LAngle => TokenKind::LAngle,
        LogosToken::RAngle => TokenKind::RAngle,
        LogosToken::GtGt => TokenKind::GtGt,
        LogosToken::Scope => TokenKind::Scope,
        LogosToken::Colon => TokenKind::Colon,
        LogosToken::Semicolon => TokenKind::Semicolon,
        LogosToken::Comma => TokenKind::Comma,
        LogosToken::Eq => TokenKind::Eq,
        LogosToken::Tilde => TokenKind::Tilde,
        LogosToken::Star => TokenKind::Star,
        LogosToken::Amp => TokenKind::Amp,
        LogosToken::AndAnd => TokenKind::AndAnd,
        LogosToken::Arrow => TokenKind::Arrow,
        LogosToken::Dot => TokenKind::Dot,
        LogosToken::Ellipsis => TokenKind::Ellipsis,
        LogosToken::Other => TokenKind::Other,
        LogosToken::BlockComment | LogosToken::Directive => TokenKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.h")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_annotations() {
        assert_eq!(
            kinds("class Foo : public QObject { Q_OBJECT signals: };"),
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Public,
                TokenKind::Identifier,
                TokenKind::LBrace,
                TokenKind::QObject,
                TokenKind::QSignals,
                TokenKind::Colon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_q_signals_alias() {
        assert_eq!(kinds("Q_SIGNALS Q_SLOTS"), vec![TokenKind::QSignals, TokenKind::QSlots, TokenKind::Eof]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("int /* block\ncomment */ x; // trailing\n"),
            vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_angle_tokens() {
        assert_eq!(
            kinds("a >> b >= c <= d"),
            vec![
                TokenKind::Identifier,
                TokenKind::GtGt,
                TokenKind::Identifier,
                TokenKind::Other,
                TokenKind::Identifier,
                TokenKind::Other,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        let tokens = Lexer::new(r#"42 0x1F 1.5f "a\"b" 'c' u8"x""#, "t.h").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[1].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[2].kind, TokenKind::FloatingLiteral);
        assert_eq!(tokens[3].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[3].lexeme, r#""a\"b""#);
        assert_eq!(tokens[4].kind, TokenKind::CharacterLiteral);
        assert_eq!(tokens[5].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn test_raw_string() {
        let tokens = Lexer::new(r#"R"x(a ")" b)x" ;"#, "t.h").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = Lexer::new("a\n\nb\n", "t.h").tokenize().unwrap();
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 3);
    }

    #[test]
    fn test_line_markers_produce_include_tokens() {
        let source = "# 1 \"main.h\"\n# 1 \"other.h\" 1\nint a;\n# 5 \"main.h\" 2\nint b;\n";
        let tokens = Lexer::new(source, "main.h").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IncludeBegin);
        assert_eq!(tokens[0].lexeme, "other.h");
        assert_eq!(tokens[1].kind, TokenKind::Int);
        assert_eq!(tokens[1].line(), 1);
        assert_eq!(tokens[4].kind, TokenKind::IncludeEnd);
        assert_eq!(tokens[5].kind, TokenKind::Int);
        assert_eq!(tokens[5].line(), 5);
    }

    #[test]
    fn test_other_directives_are_skipped() {
        assert_eq!(kinds("#pragma once\nint x;"), vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]);
    }

    #[test]
    fn test_parse_line_marker() {
        let marker = parse_line_marker("# 12 \"foo.h\" 1 3").unwrap();
        assert_eq!(marker.line, 12);
        assert_eq!(marker.file.as_deref(), Some("foo.h"));
        assert!(marker.enters);
        assert!(!marker.leaves);
        assert_eq!(parse_line_marker("#line 7").unwrap().line, 7);
        assert!(parse_line_marker("#pragma once").is_none());
    }

    #[test]
    fn test_unterminated_comment() {
        let errors = Lexer::new("int a; /* oops", "t.h").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::UnterminatedComment { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let errors = Lexer::new("const char *s = \"abc\n;", "t.h").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unknown_character_is_other() {
        let tokens = Lexer::new("a @ b", "t.h").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Other);
        assert_eq!(tokens[1].lexeme, "@");
    }
}
