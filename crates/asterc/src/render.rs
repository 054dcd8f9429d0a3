//! Ariadne-based rendering of diagnostics with source snippets.
//!
//! Rendering lives at the driver boundary: the core phases only produce
//! structured records. Spans are (line, column) pairs counted in Unicode
//! scalars, so they are converted to byte ranges against the canonical
//! source before ariadne sees them.

use std::ops::Range;

use ariadne::{Label, Report, ReportKind, Source};
use aster_common::diag::{Diagnostic, Severity};
use aster_common::span::{Position, Span};

/// Print every diagnostic to stderr with a source snippet.
pub fn report_all(source: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        let range = span_to_range(source, diag.span);
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };
        let _ = Report::<Range<usize>>::build(kind, range.clone())
            .with_code(diag.code)
            .with_message(&diag.message)
            .with_label(Label::new(range).with_message(diag.help))
            .finish()
            .eprint(Source::from(source));
    }
}

/// Convert a (line, column) span into a byte range into `source`.
fn span_to_range(source: &str, span: Span) -> Range<usize> {
    let start = offset_of(source, span.start);
    let end = offset_of(source, span.end).max(start);
    // Ariadne draws nothing for empty ranges; widen points to one byte.
    if start == end && start < source.len() {
        start..end + 1
    } else {
        start..end
    }
}

fn offset_of(source: &str, pos: Position) -> usize {
    let mut line = 1u32;
    let mut col = 1u32;
    for (offset, c) in source.char_indices() {
        if line == pos.line && col == pos.col {
            return offset;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_count_scalars_not_bytes() {
        // 'é' is two bytes but one column.
        let source = "é x\n";
        assert_eq!(offset_of(source, Position::new(1, 1)), 0);
        assert_eq!(offset_of(source, Position::new(1, 2)), 2);
        assert_eq!(offset_of(source, Position::new(1, 3)), 3);
    }

    #[test]
    fn offsets_cross_lines() {
        let source = "ab\ncd\n";
        assert_eq!(offset_of(source, Position::new(2, 1)), 3);
        assert_eq!(offset_of(source, Position::new(2, 2)), 4);
    }

    #[test]
    fn past_the_end_clamps() {
        let source = "ab";
        assert_eq!(offset_of(source, Position::new(9, 9)), 2);
    }
}
