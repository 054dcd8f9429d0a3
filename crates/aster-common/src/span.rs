use serde::{Deserialize, Serialize};

/// A source position: 1-based line and column.
///
/// Columns count Unicode scalar values, not bytes, so a position is stable
/// across re-encodings of the same text. Positions are computed by the
/// lexer against the canonical source and never adjusted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, col: u32) -> Self {
        debug_assert!(line >= 1 && col >= 1, "positions are 1-based");
        Self { line, col }
    }
}

/// A source range from `start` (inclusive) to `end` (exclusive).
///
/// Every AST and Core IR node that represents user-visible syntax owns a
/// span. Spans are immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Create a span from two positions.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        let p = Position::new(line, col);
        Self { start: p, end: p }
    }

    /// A placeholder span for synthesized nodes and tests.
    pub const DUMMY: Span = Span {
        start: Position { line: 1, col: 1 },
        end: Position { line: 1, col: 1 },
    };

    /// Merge two spans into one covering both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_ordering_is_line_major() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 5));
    }

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(Position::new(1, 5), Position::new(1, 9));
        let b = Span::new(Position::new(2, 1), Position::new(2, 4));
        let merged = a.merge(b);
        assert_eq!(merged.start, Position::new(1, 5));
        assert_eq!(merged.end, Position::new(2, 4));
    }

    #[test]
    fn span_point_is_empty() {
        assert!(Span::point(4, 7).is_empty());
        assert!(!Span::new(Position::new(1, 1), Position::new(1, 2)).is_empty());
    }

    #[test]
    fn span_serializes_to_line_col_pairs() {
        let span = Span::new(Position::new(1, 2), Position::new(1, 6));
        let json = serde_json::to_value(span).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start": {"line": 1, "col": 2},
                "end": {"line": 1, "col": 6},
            })
        );
    }
}
