//! Make-style dependency listing.

use std::fmt::{self, Write};

/// Escape a path for a make rule: spaces and `#` get a backslash, `$`
/// is doubled.
pub fn escape_dependency(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' | '#' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '$' => escaped.push_str("$$"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write `rule: dep \` followed by one dependency per continuation line.
pub fn write_dependency_file(out: &mut impl Write, rule: &str, dependencies: &[String]) -> fmt::Result {
    write!(out, "{}:", escape_dependency(rule))?;
    for dependency in dependencies {
        write!(out, " \\\n  {}", escape_dependency(dependency))?;
    }
    writeln!(out)
}
