//! Indexable token cursor with rewind support.
//!
//! The cursor is the parser's only view of the input. `index` points at the
//! next unread token; "the current symbol" is always the last consumed one
//! (`index - 1`), which is what diagnostics report and what `lexem` returns.

use crate::diagnostic::Diagnostic;
use crate::parser::error::ParseError;
use crate::parser::token::{Token, TokenKind};

/// Ordered token sequence plus a movable read position.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,

    /// Logical file stack driven by `IncludeBegin`/`IncludeEnd`
    filenames: Vec<String>,
}

impl TokenCursor {
    /// Wrap a token sequence. An `Eof` token is appended when missing.
    pub fn new(mut tokens: Vec<Token>, file_name: impl Into<String>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(Token::line).unwrap_or(1);
            tokens.push(Token::at_line(TokenKind::Eof, "", line));
        }
        Self {
            tokens,
            index: 0,
            filenames: vec![file_name.into()],
        }
    }

    // ========================================================================
    // Position
    // ========================================================================

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn set_index(&mut self, index: usize) {
        self.index = index.min(self.tokens.len());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True while there are unread tokens before `Eof`.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len() && self.tokens[self.index].kind != TokenKind::Eof
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Consume one token and return its kind. Returns `Eof` at the end
    /// without moving past it.
    pub fn next(&mut self) -> TokenKind {
        match self.tokens.get(self.index) {
            Some(token) if token.kind != TokenKind::Eof => {
                self.index += 1;
                token.kind
            }
            _ => TokenKind::Eof,
        }
    }

    /// Consume one token, failing unless it has the expected kind.
    pub fn next_expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.next() == kind {
            return Ok(());
        }
        Err(self.parse_error())
    }

    /// Step back one token.
    #[inline]
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Consume the next token only when it has the given kind.
    pub fn test(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind && kind != TokenKind::Eof {
            self.index += 1;
            return true;
        }
        false
    }

    /// Kind of the next unread token.
    #[inline]
    pub fn peek(&self) -> TokenKind {
        self.peek_at(0)
    }

    /// Kind of the token `offset` positions after the next unread one.
    pub fn peek_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.index + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Lexeme of the token `offset` positions after the next unread one.
    pub fn peek_lexem(&self, offset: usize) -> &str {
        self.tokens
            .get(self.index + offset)
            .map(|t| t.lexeme.as_str())
            .unwrap_or("")
    }

    /// Line of the next unread token.
    pub fn peek_line(&self) -> u32 {
        self.tokens
            .get(self.index)
            .map(Token::line)
            .unwrap_or_else(|| self.line())
    }

    /// Kind of the token `back` positions before the last consumed one.
    pub fn lookback(&self, back: usize) -> TokenKind {
        self.index
            .checked_sub(back + 1)
            .and_then(|at| self.tokens.get(at))
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// The last consumed token.
    pub fn symbol(&self) -> &Token {
        let at = self.index.saturating_sub(1).min(self.tokens.len() - 1);
        &self.tokens[at]
    }

    /// Lexeme of the last consumed token.
    pub fn lexem(&self) -> &str {
        &self.symbol().lexeme
    }

    /// Line of the last consumed token.
    pub fn line(&self) -> u32 {
        self.symbol().line()
    }

    /// Value of the string literal just consumed, with adjacent literals
    /// concatenated and escapes resolved.
    pub fn string_value(&mut self) -> String {
        let mut text = literal_value(self.lexem());
        while self.test(TokenKind::StringLiteral) {
            text.push_str(&literal_value(self.lexem()));
        }
        text
    }

    // ========================================================================
    // Skipping
    // ========================================================================

    /// Skip forward to the first unnested `target`, consuming it.
    ///
    /// Parenthesis, bracket and brace depth are tracked; angle brackets only
    /// while no parenthesis or brace is open, so `a < b` in an expression
    /// does not count. When called right after consuming an opening
    /// delimiter, that delimiter counts as already open.
    ///
    /// Returns false when the target is not found before an unbalanced
    /// closer, a top-level semicolon, or the end of input.
    pub fn until(&mut self, target: TokenKind) -> bool {
        let mut brace = 0i32;
        let mut bracket = 0i32;
        let mut paren = 0i32;
        let mut angle = 0i32;

        if self.index > 0 {
            match self.tokens[self.index - 1].kind {
                TokenKind::LBrace => brace += 1,
                TokenKind::LBracket => bracket += 1,
                TokenKind::LParen => paren += 1,
                TokenKind::LAngle => angle += 1,
                _ => {}
            }
        }

        // While looking for the comma that ends a default argument, the latest
        // candidate seen with unbalanced angles is remembered; `<` may have
        // been a comparison.
        let mut possible: Option<usize> = None;

        while self.index < self.tokens.len() {
            let mut kind = self.tokens[self.index].kind;
            if kind == TokenKind::Eof {
                break;
            }
            self.index += 1;
            match kind {
                TokenKind::LBrace => brace += 1,
                TokenKind::RBrace => brace -= 1,
                TokenKind::LBracket => bracket += 1,
                TokenKind::RBracket => bracket -= 1,
                TokenKind::LParen => paren += 1,
                TokenKind::RParen => paren -= 1,
                TokenKind::LAngle if paren == 0 && brace == 0 => angle += 1,
                TokenKind::RAngle if paren == 0 && brace == 0 => angle -= 1,
                TokenKind::GtGt if paren == 0 && brace == 0 => {
                    angle -= 2;
                    kind = TokenKind::RAngle;
                }
                _ => {}
            }

            if kind == target
                && brace <= 0
                && bracket <= 0
                && paren <= 0
                && (target != TokenKind::RAngle || angle <= 0)
            {
                if target != TokenKind::Comma || angle <= 0 {
                    return true;
                }
                possible = Some(self.index);
            }

            if target == TokenKind::Comma && kind == TokenKind::Eq {
                if let Some(at) = possible {
                    self.index = at;
                    return true;
                }
            }

            if brace < 0 || bracket < 0 || paren < 0 || (target == TokenKind::RAngle && angle < 0) {
                self.index -= 1;
                break;
            }

            if brace <= 0 && kind == TokenKind::Semicolon {
                break;
            }
        }

        if target == TokenKind::Comma && angle != 0 {
            if let Some(at) = possible {
                self.index = at;
                return true;
            }
        }
        false
    }

    /// Like [`until`](Self::until), returning the source text from the last
    /// consumed token through the target, with a space only where two tokens
    /// would otherwise fuse.
    pub fn lexem_until(&mut self, target: TokenKind) -> String {
        let from = self.index.max(1);
        self.until(target);
        let mut text = String::new();
        for token in &self.tokens[from - 1..self.index] {
            let next = token.lexeme.as_str();
            if let (Some(prev), Some(first)) = (text.chars().last(), next.chars().next()) {
                if (is_ident_char(prev) && is_ident_char(first))
                    || (prev == '<' && first == ':')
                    || (prev == '>' && first == '>')
                {
                    text.push(' ');
                }
            }
            text.push_str(next);
        }
        text
    }

    /// Skip C++11 attributes and the common compiler-specific spellings.
    /// Returns true when anything was skipped.
    pub fn skip_cxx_attributes(&mut self) -> bool {
        let mut skipped = false;
        loop {
            let rewind = self.index;
            if self.peek() == TokenKind::LBracket && self.peek_at(1) == TokenKind::LBracket {
                self.index += 2;
                if self.until(TokenKind::RBracket) && self.test(TokenKind::RBracket) {
                    skipped = true;
                    continue;
                }
                self.index = rewind;
                return skipped;
            }
            if self.peek() == TokenKind::Identifier
                && matches!(self.peek_lexem(0), "__attribute__" | "__declspec" | "alignas")
                && self.peek_at(1) == TokenKind::LParen
            {
                self.index += 2;
                if self.until(TokenKind::RParen) {
                    skipped = true;
                    continue;
                }
                self.index = rewind;
            }
            return skipped;
        }
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Current logical file name.
    pub fn current_file(&self) -> &str {
        self.filenames.last().map(String::as_str).unwrap_or("")
    }

    /// Depth of the include stack; 1 while inside the main file.
    pub fn include_depth(&self) -> usize {
        self.filenames.len()
    }

    pub fn push_file(&mut self, name: impl Into<String>) {
        self.filenames.push(name.into());
    }

    pub fn pop_file(&mut self) {
        if self.filenames.len() > 1 {
            self.filenames.pop();
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Error tied to the last consumed token.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.current_file(), self.line(), message)
    }

    /// Generic "Parse error at" error for the last consumed token.
    pub fn parse_error(&self) -> ParseError {
        self.error(format!("Parse error at \"{}\"", self.lexem()))
    }

    /// Warning tied to the last consumed token.
    pub fn warning(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::warning(self.current_file(), self.line(), message).with_span(self.symbol().span)
    }

    /// Note tied to the last consumed token.
    pub fn note(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::note(self.current_file(), self.line(), message).with_span(self.symbol().span)
    }
}

fn literal_value(lexeme: &str) -> String {
    let body = lexeme.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    if lexeme[..lexeme.len() - body.len()].ends_with('R') {
        return unquote(lexeme).to_string();
    }
    unescape(unquote(lexeme))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Strip an encoding prefix and the surrounding quotes from a literal.
pub fn unquote(lexeme: &str) -> &str {
    let body = lexeme.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let prefix = &lexeme[..lexeme.len() - body.len()];
    if prefix.ends_with('R') {
        // R"delim(text)delim"
        if let (Some(open), Some(close)) = (body.find('('), body.rfind(')')) {
            if open < close {
                return &body[open + 1..close];
            }
        }
    }
    body.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(body)
}

/// Resolve C escape sequences in the body of a string literal.
///
/// `\x` and octal escapes denote single bytes, so `"\xc3\xa9"` is the two
/// bytes of `é`. A byte sequence that is not valid UTF-8 has its invalid
/// bytes replaced with U+FFFD.
pub fn unescape(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'a') => out.push(0x07),
            Some(b'b') => out.push(0x08),
            Some(b'f') => out.push(0x0c),
            Some(b'v') => out.push(0x0b),
            Some(b'x') => {
                let mut value = 0u32;
                while let Some(digit) = bytes.peek().and_then(|d| (*d as char).to_digit(16)) {
                    value = (value << 4 | digit) & 0xff;
                    bytes.next();
                }
                out.push(value as u8);
            }
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match bytes.peek().and_then(|d| (*d as char).to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            bytes.next();
                        }
                        None => break,
                    }
                }
                out.push((value & 0xff) as u8);
            }
            Some(other) => out.push(other),
            None => out.push(b'\\'),
        }
    }
    match String::from_utf8(out) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
