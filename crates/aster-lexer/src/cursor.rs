use aster_common::span::Position;

/// Character-level source iterator with line/column tracking.
///
/// Aster spans are 1-based (line, column) pairs counted in Unicode scalar
/// values, so the cursor tracks positions directly instead of byte
/// offsets. The input is canonical text: LF line endings only.
pub struct Cursor<'src> {
    chars: std::str::Chars<'src>,
    line: u32,
    col: u32,
}

impl<'src> Cursor<'src> {
    /// Create a cursor at line 1, column 1.
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars(),
            line: 1,
            col: 1,
        }
    }

    /// Look at the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Look one character past the current one.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Consume the current character, advancing the position.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Current position.
    pub fn pos(&self) -> Position {
        Position::new(self.line, self.col)
    }

    /// Whether all input has been consumed.
    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// Consume characters while the predicate holds, collecting them.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if predicate(c) {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    /// Consume characters up to (not including) the next newline.
    pub fn eat_to_line_end(&mut self) -> String {
        self.eat_while(|c| c != '\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_columns_in_scalars() {
        let mut cursor = Cursor::new("é1");
        assert_eq!(cursor.pos(), Position::new(1, 1));
        cursor.advance();
        assert_eq!(cursor.pos(), Position::new(1, 2));
        cursor.advance();
        assert_eq!(cursor.pos(), Position::new(1, 3));
        assert!(cursor.is_eof());
    }

    #[test]
    fn newline_resets_column() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.pos(), Position::new(1, 3));
        cursor.advance(); // \n
        assert_eq!(cursor.pos(), Position::new(2, 1));
    }

    #[test]
    fn peek_does_not_consume() {
        let cursor = Cursor::new("xy");
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.peek_next(), Some('y'));
        assert_eq!(cursor.pos(), Position::new(1, 1));
    }

    #[test]
    fn eat_while_collects() {
        let mut cursor = Cursor::new("aaab");
        assert_eq!(cursor.eat_while(|c| c == 'a'), "aaa");
        assert_eq!(cursor.peek(), Some('b'));
    }

    #[test]
    fn eat_to_line_end_stops_before_newline() {
        let mut cursor = Cursor::new("rest of line\nnext");
        assert_eq!(cursor.eat_to_line_end(), "rest of line");
        assert_eq!(cursor.peek(), Some('\n'));
    }
}
