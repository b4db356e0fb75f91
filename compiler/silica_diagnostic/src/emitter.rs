//! Terminal rendering for diagnostics.

use std::io::{self, IsTerminal, Write};

use silica_ir::Span;

use crate::{Diagnostic, Severity};

/// Resolve a byte offset to a 1-based (line, column) pair.
pub fn line_col(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let mut line = 1;
    let mut line_start = 0;
    for (i, b) in source.bytes().enumerate().take(offset) {
        if b == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, (offset - line_start) as u32 + 1)
}

/// The text of the (1-based) line containing `offset`.
fn line_text(source: &str, offset: u32) -> &str {
    let offset = (offset as usize).min(source.len());
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = source[start..].find('\n').map_or(source.len(), |i| start + i);
    &source[start..end]
}

/// Human-readable diagnostic output with optional ANSI color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    fn write_severity(&mut self, severity: Severity) {
        if self.colors {
            let color = match severity {
                Severity::Error => "\x1b[1;31m",
                Severity::Warning => "\x1b[1;33m",
                Severity::Note => "\x1b[1;36m",
            };
            let _ = write!(self.writer, "{color}{severity}\x1b[0m");
        } else {
            let _ = write!(self.writer, "{severity}");
        }
    }

    fn write_marker(&mut self, marker: &str, primary: bool) {
        if self.colors {
            let color = if primary { "\x1b[1;31m" } else { "\x1b[1;34m" };
            let _ = write!(self.writer, "{color}{marker}\x1b[0m");
        } else {
            let _ = write!(self.writer, "{marker}");
        }
    }

    /// Render one diagnostic against the unit's file name and source text.
    pub fn emit(&mut self, diagnostic: &Diagnostic, file: &str, source: &str) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity);
        if self.colors {
            let _ = write!(self.writer, "\x1b[1m[{}]\x1b[0m", diagnostic.code);
        } else {
            let _ = write!(self.writer, "[{}]", diagnostic.code);
        }
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.emit_label(label.span, &label.message, label.is_primary, file, source);
        }

        for note in &diagnostic.notes {
            let _ = writeln!(self.writer, "  = note: {note}");
        }

        let _ = writeln!(self.writer);
    }

    fn emit_label(&mut self, span: Span, message: &str, primary: bool, file: &str, source: &str) {
        let (line, col) = line_col(source, span.start);
        let _ = writeln!(self.writer, "  --> {file}:{line}:{col}");

        let text = line_text(source, span.start);
        let _ = writeln!(self.writer, "   |");
        let _ = writeln!(self.writer, "{line:>3}| {text}");

        // Caret line: underline as much of the span as fits on this line.
        let room = text.len().saturating_sub(col as usize - 1).max(1);
        let width = (span.len() as usize).clamp(1, room);
        let marker = if primary { "^" } else { "-" }.repeat(width);
        let _ = write!(self.writer, "   | {}", " ".repeat(col as usize - 1));
        self.write_marker(&marker, primary);
        let _ = writeln!(self.writer, " {message}");
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Emitter for stderr with auto-detected color support.
    pub fn stderr() -> Self {
        let colors = io::stderr().is_terminal();
        TerminalEmitter { writer: io::stderr(), colors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_col_basic() {
        let src = "int x;\nfloat y;\n";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (1, 5));
        assert_eq!(line_col(src, 7), (2, 1));
        assert_eq!(line_col(src, 13), (2, 7));
    }

    #[test]
    fn line_col_clamps_past_end() {
        assert_eq!(line_col("ab", 100), (1, 3));
    }

    #[test]
    fn line_text_extracts_line() {
        let src = "first\nsecond\nthird";
        assert_eq!(line_text(src, 0), "first");
        assert_eq!(line_text(src, 8), "second");
        assert_eq!(line_text(src, 14), "third");
    }

    #[test]
    fn emit_renders_location_and_caret() {
        let source = "int x = ;";
        let d = Diagnostic::error(ErrorCode::E2004)
            .with_message("expected expression, found `;`")
            .with_label(Span::new(8, 9), "expected expression");

        let mut out = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut out, false);
        emitter.emit(&d, "bad.glsl", source);
        emitter.flush();

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("error[E2004]: expected expression, found `;`"));
        assert!(text.contains("--> bad.glsl:1:9"));
        assert!(text.contains("int x = ;"));
        assert!(text.contains("^ expected expression"));
    }

    #[test]
    fn emit_with_color_wraps_in_ansi() {
        let d = Diagnostic::error(ErrorCode::E0001).with_message("unrecognized character");
        let mut out = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut out, true);
        emitter.emit(&d, "x.glsl", "");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("\x1b["));
        assert!(text.contains("E0001"));
    }
}
