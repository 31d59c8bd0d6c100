//! Type name normalization.
//!
//! Metadata stores one canonical spelling per type so that signatures written
//! in different styles compare equal at runtime: whitespace is dropped unless
//! two words would fuse, `const T&` and by-value `const T` become `T`, east
//! const moves west, elaborated-type keywords disappear and the builtin
//! integer spellings collapse to their short names.

/// Normalize a C++ type spelling.
pub fn normalize_type(name: &str) -> String {
    let pieces = split(name);
    let mut out = String::with_capacity(name.len());
    normalize_segment(&pieces, &mut out);
    out
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Word(String),
    Sym(&'static str),
}

fn split(text: &str) -> Vec<Piece> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$') {
                i += 1;
            }
            pieces.push(Piece::Word(text[start..i].to_string()));
            continue;
        }
        if !c.is_ascii() {
            let ch = text[i..].chars().next().unwrap_or('?');
            pieces.push(Piece::Word(ch.to_string()));
            i += ch.len_utf8();
            continue;
        }
        let two = text.get(i..i + 2).unwrap_or("");
        let sym: &'static str = match two {
            "::" => "::",
            "&&" => "&&",
            _ => match c {
                b'<' => "<",
                b'>' => ">",
                b',' => ",",
                b'*' => "*",
                b'&' => "&",
                b'(' => "(",
                b')' => ")",
                b'[' => "[",
                b']' => "]",
                b'=' => "=",
                b'-' => "-",
                b'.' => ".",
                _ => "?",
            },
        };
        i += sym.len().max(1);
        if sym == "?" {
            // keep unknown punctuation as-is
            pieces.push(Piece::Word((c as char).to_string()));
        } else {
            pieces.push(Piece::Sym(sym));
        }
    }
    pieces
}

fn is_word(piece: &Piece, word: &str) -> bool {
    matches!(piece, Piece::Word(w) if w == word)
}

/// Split a piece run at top-level commas of the current template level.
fn split_arguments(pieces: &[Piece]) -> Vec<&[Piece]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Sym("<") | Piece::Sym("(") | Piece::Sym("[") => depth += 1,
            Piece::Sym(">") | Piece::Sym(")") | Piece::Sym("]") => depth -= 1,
            Piece::Sym(",") if depth == 0 => {
                parts.push(&pieces[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&pieces[start..]);
    parts
}

fn normalize_segment(pieces: &[Piece], out: &mut String) {
    let mut pieces: Vec<Piece> = pieces
        .iter()
        .filter(|p| !matches!(p, Piece::Word(w) if w == "struct" || w == "class" || w == "enum" || w == "typename"))
        .cloned()
        .collect();

    strip_const(&mut pieces);
    collapse_builtins(&mut pieces);

    let mut i = 0;
    while i < pieces.len() {
        match &pieces[i] {
            Piece::Sym("<") => {
                let close = matching_angle(&pieces, i);
                out.push('<');
                let inner = &pieces[i + 1..close];
                for (n, argument) in split_arguments(inner).into_iter().enumerate() {
                    if n > 0 {
                        out.push(',');
                    }
                    normalize_segment(argument, out);
                }
                if close < pieces.len() {
                    out.push('>');
                }
                i = close + 1;
            }
            Piece::Word(word) => {
                if out.ends_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                    out.push(' ');
                }
                out.push_str(word);
                i += 1;
            }
            Piece::Sym(sym) => {
                out.push_str(sym);
                i += 1;
            }
        }
    }
}

fn matching_angle(pieces: &[Piece], open: usize) -> usize {
    let mut depth = 0;
    for (i, piece) in pieces.iter().enumerate().skip(open) {
        match piece {
            Piece::Sym("<") => depth += 1,
            Piece::Sym(">") => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    pieces.len()
}

/// Drop `const` where it does not change the type for metadata purposes.
fn strip_const(pieces: &mut Vec<Piece>) {
    let top_level = |pieces: &[Piece]| -> Vec<usize> {
        let mut depth = 0;
        let mut at = Vec::new();
        for (i, piece) in pieces.iter().enumerate() {
            match piece {
                Piece::Sym("<") => depth += 1,
                Piece::Sym(">") => depth -= 1,
                _ if depth == 0 => at.push(i),
                _ => {}
            }
        }
        at
    };
    let positions = top_level(pieces);
    let has_pointer = positions.iter().any(|&i| matches!(pieces[i], Piece::Sym("*")));
    let ends_with_ref = matches!(pieces.last(), Some(Piece::Sym("&")));

    // `T const *` becomes `const T*`
    if has_pointer {
        if let Some(star) = positions.iter().copied().find(|&i| matches!(pieces[i], Piece::Sym("*"))) {
            if star > 0 && is_word(&pieces[star - 1], "const") && !is_word(&pieces[0], "const") {
                pieces.remove(star - 1);
                pieces.insert(0, Piece::Word("const".into()));
            }
        }
        return;
    }

    if ends_with_ref {
        let const_at = positions
            .iter()
            .copied()
            .find(|&i| is_word(&pieces[i], "const"));
        if let Some(at) = const_at {
            pieces.pop();
            pieces.remove(at);
        }
        return;
    }

    if matches!(pieces.last(), Some(Piece::Sym("&&"))) {
        return;
    }

    // by-value const is meaningless in a signature
    if let Some(at) = positions.iter().copied().find(|&i| is_word(&pieces[i], "const")) {
        pieces.remove(at);
    }
}

/// Map the builtin integer spellings to their canonical names.
fn collapse_builtins(pieces: &mut Vec<Piece>) {
    const WORDS: [&str; 5] = ["unsigned", "signed", "int", "long", "short"];
    let mut i = 0;
    while i < pieces.len() {
        let start = i;
        let mut words = Vec::new();
        while i < pieces.len() {
            match &pieces[i] {
                Piece::Word(w) if WORDS.contains(&w.as_str()) || (w == "char" && !words.is_empty()) => {
                    words.push(w.clone());
                    i += 1;
                }
                _ => break,
            }
        }
        if words.is_empty() {
            i += 1;
            continue;
        }
        let canonical = canonical_builtin(&words);
        pieces.splice(start..i, canonical.into_iter().map(|w| Piece::Word(w.to_string())));
        i = start + 1;
    }
}

fn canonical_builtin(words: &[String]) -> Vec<&'static str> {
    let unsigned = words.iter().any(|w| w == "unsigned");
    let signed = words.iter().any(|w| w == "signed");
    let longs = words.iter().filter(|w| *w == "long").count();
    let short = words.iter().any(|w| w == "short");
    let char_ = words.iter().any(|w| w == "char");

    match (unsigned, char_, short, longs) {
        (true, true, _, _) => vec!["uchar"],
        (false, true, _, _) if signed => vec!["signed", "char"],
        (false, true, _, _) => vec!["char"],
        (true, false, true, _) => vec!["ushort"],
        (true, false, false, 2) => vec!["qulonglong"],
        (true, false, false, 1) => vec!["ulong"],
        (true, false, false, _) => vec!["uint"],
        (false, false, true, _) => vec!["short"],
        (false, false, false, 2) => vec!["qlonglong"],
        (false, false, false, 1) => vec!["long"],
        _ => vec!["int"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_reference_becomes_value() {
        assert_eq!(normalize_type("const QString &"), "QString");
        assert_eq!(normalize_type("QString const&"), "QString");
    }

    #[test]
    fn test_const_value_dropped() {
        assert_eq!(normalize_type("const int"), "int");
    }

    #[test]
    fn test_pointer_const_kept_west() {
        assert_eq!(normalize_type("const char *"), "const char*");
        assert_eq!(normalize_type("char const *"), "const char*");
    }

    #[test]
    fn test_builtin_spellings() {
        assert_eq!(normalize_type("unsigned int"), "uint");
        assert_eq!(normalize_type("unsigned"), "uint");
        assert_eq!(normalize_type("unsigned long long"), "qulonglong");
        assert_eq!(normalize_type("long long int"), "qlonglong");
        assert_eq!(normalize_type("unsigned char"), "uchar");
        assert_eq!(normalize_type("signed char"), "signed char");
        assert_eq!(normalize_type("short int"), "short");
        assert_eq!(normalize_type("long"), "long");
        assert_eq!(normalize_type("long double"), "long double");
    }

    #[test]
    fn test_templates() {
        assert_eq!(normalize_type("QMap< QString , QVariant >"), "QMap<QString,QVariant>");
        assert_eq!(normalize_type("QList<QList<int> >"), "QList<QList<int>>");
        assert_eq!(normalize_type("QList<const QObject *>"), "QList<const QObject*>");
    }

    #[test]
    fn test_elaborated_keywords_removed() {
        assert_eq!(normalize_type("struct Foo *"), "Foo*");
        assert_eq!(normalize_type("enum Qt::Orientation"), "Qt::Orientation");
    }

    #[test]
    fn test_rvalue_reference_kept() {
        assert_eq!(normalize_type("QString &&"), "QString&&");
    }

    #[test]
    fn test_scoped_names() {
        assert_eq!(normalize_type("std :: string"), "std::string");
    }
}
