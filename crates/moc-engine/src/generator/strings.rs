//! String registration and the generated string data block.

use std::fmt::{self, Write};

use super::builtin::is_builtin;
use crate::interner::StringTable;
use crate::model::{ClassDef, EnumDef, FunctionDef};

fn register_function(strings: &mut StringTable, f: &FunctionDef) {
    strings.register(&f.name);
    if !is_builtin(&f.normalized_type) {
        strings.register(&f.normalized_type);
    }
    strings.register(&f.tag);
    for arg in &f.arguments {
        if !is_builtin(&arg.normalized_type) {
            strings.register(&arg.normalized_type);
        }
        strings.register(&arg.name);
    }
}

/// Register every string the metadata of `def` refers to, in layout order.
///
/// `enums` are the declared enums as exposed in the metadata (aliases
/// already applied).
pub fn register_strings(def: &ClassDef, enums: &[EnumDef]) -> StringTable {
    let mut strings = StringTable::new();
    strings.register(&def.qualified);

    for info in &def.class_info_list {
        strings.register(&info.name);
        strings.register(&info.value);
    }

    for f in def.methods().chain(&def.constructor_list) {
        register_function(&mut strings, f);
    }

    for p in &def.property_list {
        strings.register(&p.name);
        if !is_builtin(&p.ty) {
            strings.register(&p.ty);
        }
        if p.notify_id < -1 {
            strings.register(&p.notify);
        }
    }

    for e in enums {
        strings.register(&e.name);
        if !e.enum_name.is_empty() {
            strings.register(&e.enum_name);
        }
        for value in &e.values {
            strings.register(value);
        }
    }
    strings
}

/// Escape a string for a C string literal.
pub fn escape_c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &byte in s.as_bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            // `??x` would form a trigraph
            b'?' if out.ends_with('?') => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            _ => {
                out.push_str(&format!("\\{byte:03o}"));
            }
        }
    }
    out
}

fn comment_text(s: &str) -> String {
    let shown: String = if s.chars().count() > 32 {
        s.chars().take(29).chain("...".chars()).collect()
    } else {
        s.to_string()
    };
    // keep the comment on one line and closed
    shown.replace(['\n', '\r'], " ").replace("*/", "* /")
}

/// Write the `qt_meta_stringdata_<ident>` struct and its initializer.
pub fn write_string_data(out: &mut impl Write, ident: &str, strings: &StringTable) -> fmt::Result {
    writeln!(out, "namespace {{")?;
    writeln!(out, "struct qt_meta_stringdata_{ident}_t {{")?;
    writeln!(out, "    uint offsetsAndSizes[{}];", strings.len() * 2)?;
    for (i, s) in strings.iter().enumerate() {
        writeln!(out, "    char stringdata{}[{}];", i, s.len() + 1)?;
    }
    writeln!(out, "}};")?;
    writeln!(out, "#define QT_MOC_LITERAL(ofs, len) \\")?;
    writeln!(out, "    uint(sizeof(qt_meta_stringdata_{ident}_t::offsetsAndSizes) + ofs), len ")?;
    writeln!(out, "Q_CONSTINIT static const qt_meta_stringdata_{ident}_t qt_meta_stringdata_{ident} = {{")?;
    writeln!(out, "    {{")?;

    let mut offset = 0;
    let last = strings.len().saturating_sub(1);
    for (i, s) in strings.iter().enumerate() {
        let comma = if i == last { " " } else { "," };
        writeln!(out, "        QT_MOC_LITERAL({}, {}){}  // \"{}\"", offset, s.len(), comma, comment_text(s))?;
        offset += s.len() + 1;
    }
    writeln!(out, "    }},")?;

    for (i, s) in strings.iter().enumerate() {
        let comma = if i == last { "" } else { "," };
        writeln!(out, "    \"{}\"{}", escape_c_string(s), comma)?;
    }
    writeln!(out, "}};")?;
    writeln!(out, "#undef QT_MOC_LITERAL")?;
    writeln!(out, "}} // unnamed namespace")?;
    Ok(())
}
