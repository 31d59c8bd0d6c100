//! Colored diagnostic output for the CLI.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;

use moc_engine::diagnostic::emit;
use moc_engine::parser::Span;
use moc_engine::{Diagnostic, Severity};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Byte range of a 1-based line in `source`, without its newline.
pub fn line_span(source: &str, line: u32) -> Option<Span> {
    if line == 0 {
        return None;
    }
    let mut start = 0;
    for (index, text) in source.split('\n').enumerate() {
        let end = start + text.len();
        if index + 1 == line as usize {
            let trimmed = text.trim_end_matches('\r');
            return Some(Span::new(start, start + trimmed.len(), line));
        }
        start = end + 1;
    }
    None
}

/// Writes diagnostics to stderr.
pub struct DiagnosticPrinter {
    stderr: StandardStream,
}

impl DiagnosticPrinter {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stderr: StandardStream::stderr(choice),
        }
    }

    /// Print diagnostics of one input.
    ///
    /// Messages located in the input itself get a source snippet; messages
    /// from line-marker files or without a line use the one-line form.
    pub fn print(&mut self, input_name: &str, source: &str, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            let located = if diagnostic.file == input_name {
                diagnostic
                    .span
                    .or_else(|| line_span(source, diagnostic.line))
                    .map(|span| diagnostic.clone().with_span(span))
            } else {
                None
            };
            match located {
                Some(diagnostic) => {
                    if emit(&mut self.stderr, input_name, source, std::slice::from_ref(&diagnostic)).is_err() {
                        self.print_line(&diagnostic);
                    }
                }
                None => self.print_line(diagnostic),
            }
        }
    }

    /// Classic `file:line:1: severity: message` form.
    pub fn print_line(&mut self, diagnostic: &Diagnostic) {
        if diagnostic.line > 0 {
            let _ = write!(self.stderr, "{}:{}:1: ", diagnostic.file, diagnostic.line);
        } else {
            let _ = write!(self.stderr, "{}: ", diagnostic.file);
        }
        let color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Note => Color::Cyan,
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "{}", diagnostic.severity);
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", diagnostic.message);
    }

    /// Error without a source location.
    pub fn error(&mut self, message: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "error");
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let source = "first\nsecond line\r\nthird";
        assert_eq!(line_span(source, 1), Some(Span::new(0, 5, 1)));
        assert_eq!(line_span(source, 2), Some(Span::new(6, 17, 2)));
        assert_eq!(line_span(source, 3), Some(Span::new(19, 24, 3)));
        assert_eq!(line_span(source, 4), None);
        assert_eq!(line_span(source, 0), None);
    }

    #[test]
    fn test_no_color_env_wins() {
        // only asserts the flag mapping when NO_COLOR is absent
        if std::env::var_os("NO_COLOR").is_none() {
            assert_eq!(resolve_color_choice(Some("always")), ColorChoice::Always);
            assert_eq!(resolve_color_choice(Some("never")), ColorChoice::Never);
            assert_eq!(resolve_color_choice(None), ColorChoice::Auto);
        }
    }
}
