//! Aster lexer: canonical text to an indentation-aware token stream.
//!
//! The lexer is layout-sensitive: it tracks an indent stack and emits
//! synthetic `Indent`/`Dedent`/`Newline` tokens alongside the word and
//! punctuation tokens. Comments, blank lines, and error-recovery junk ride
//! on the trivia channel, invisible to the parser but sufficient to
//! reconstruct the canonical source losslessly.
//!
//! Input must already be canonical (see [`canon`]): LF endings, no tabs,
//! `//` comments only.

pub mod canon;
mod cursor;
pub mod lexicon;

use aster_common::diag::{Diagnostics, FixIt};
use aster_common::span::{Position, Span};
use aster_common::token::{Token, TokenKind};
use cursor::Cursor;
pub use lexicon::Lexicon;

/// Tokenize canonical source text under the given lexicon.
///
/// The result always ends with `Eof`, and every `Indent` is matched by a
/// `Dedent` before it. Lexical errors produce diagnostics and the lexer
/// resynchronizes at the next newline.
pub fn lex(source: &str, lexicon: &Lexicon, diags: &mut Diagnostics) -> Vec<Token> {
    Lexer {
        cursor: Cursor::new(source),
        lexicon,
        diags,
        tokens: Vec::new(),
        indents: vec![0],
    }
    .run()
}

struct Lexer<'src, 'lex, 'd> {
    cursor: Cursor<'src>,
    lexicon: &'lex Lexicon,
    diags: &'d mut Diagnostics,
    tokens: Vec<Token>,
    /// Stack of indentation widths; the bottom entry is always 0.
    indents: Vec<u32>,
}

impl Lexer<'_, '_, '_> {
    fn run(mut self) -> Vec<Token> {
        while !self.cursor.is_eof() {
            self.lex_line();
        }
        let end = self.cursor.pos();
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, "", Span::new(end, end));
        }
        self.push(TokenKind::Eof, "", Span::new(end, end));
        log::debug!("lexed {} tokens", self.tokens.len());
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, span: Span) {
        self.tokens.push(Token::new(kind, text, span));
    }

    fn push_trivia(&mut self, kind: TokenKind, text: impl Into<String>, span: Span) {
        self.tokens.push(Token::trivia(kind, text, span));
    }

    // ── Lines and layout ───────────────────────────────────────────────

    fn lex_line(&mut self) {
        let width = self.cursor.eat_while(|c| c == ' ').chars().count() as u32;
        match self.cursor.peek() {
            None => {}
            Some('\n') => {
                // Blank line: trivia marker only, no layout effect.
                let p = self.cursor.pos();
                self.push_trivia(TokenKind::Blank, "", Span::new(p, p));
                self.cursor.advance();
            }
            Some('/') if self.cursor.peek_next() == Some('/') => {
                // Comment-only line: trivia, no layout effect.
                self.lex_comment();
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
            }
            Some(_) => {
                self.handle_indent(width);
                self.lex_rest_of_line();
            }
        }
    }

    fn handle_indent(&mut self, width: u32) {
        let here = self.cursor.pos();
        let span = Span::new(here, here);
        let current = *self.indents.last().expect("indent stack is never empty");
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, "", span);
        } else if width < current {
            while *self.indents.last().unwrap() > width {
                self.indents.pop();
                self.push(TokenKind::Dedent, "", span);
            }
            if *self.indents.last().unwrap() != width {
                // Dedent to a level not on the stack. Recover by opening a
                // fresh level so the stream stays balanced.
                self.diags
                    .emit("E005", span, &[("col", (width + 1).to_string())]);
                self.indents.push(width);
                self.push(TokenKind::Indent, "", span);
            }
        }
    }

    fn lex_rest_of_line(&mut self) {
        loop {
            self.cursor.eat_while(|c| c == ' ');
            let start = self.cursor.pos();
            let Some(c) = self.cursor.peek() else {
                // No trailing newline in the source; synthesize one so the
                // parser always sees a terminated logical line.
                self.push(TokenKind::Newline, "", Span::new(start, start));
                return;
            };
            match c {
                '\n' => {
                    self.cursor.advance();
                    self.push(TokenKind::Newline, "", Span::new(start, self.cursor.pos()));
                    return;
                }
                '/' if self.cursor.peek_next() == Some('/') => self.lex_comment(),
                '"' => self.lex_string(start),
                '0'..='9' => self.lex_number(start),
                ':' => self.single(TokenKind::Colon, start),
                ',' => self.single(TokenKind::Comma, start),
                '(' => self.single(TokenKind::LParen, start),
                ')' => self.single(TokenKind::RParen, start),
                '.' => self.single(TokenKind::Dot, start),
                c if is_word_start(c) => self.lex_word(start),
                other => {
                    let span = Span::new(start, self.peek_end(start));
                    let args = [("char", other.to_string())];
                    if other == ';' {
                        // Sentences end with `.`; suggest the swap.
                        self.diags.emit_with_fix(
                            "E004",
                            span,
                            &args,
                            FixIt {
                                span,
                                replacement: ".".to_string(),
                            },
                        );
                    } else {
                        self.diags.emit("E004", span, &args);
                    }
                    self.recover_to_line_end(start);
                }
            }
        }
    }

    fn peek_end(&self, start: Position) -> Position {
        Position::new(start.line, start.col + 1)
    }

    fn single(&mut self, kind: TokenKind, start: Position) {
        let c = self.cursor.advance().expect("peeked");
        self.push(kind, c.to_string(), Span::new(start, self.cursor.pos()));
    }

    /// Consume the remainder of the line as error trivia.
    fn recover_to_line_end(&mut self, start: Position) {
        let junk = self.cursor.eat_to_line_end();
        let span = Span::new(start, self.cursor.pos());
        self.push_trivia(TokenKind::Error, junk, span);
    }

    // ── Comments ───────────────────────────────────────────────────────

    fn lex_comment(&mut self) {
        let start = self.cursor.pos();
        let text = self.cursor.eat_to_line_end();
        let span = Span::new(start, self.cursor.pos());
        self.push_trivia(TokenKind::Comment, text, span);
    }

    // ── Strings ────────────────────────────────────────────────────────

    fn lex_string(&mut self, start: Position) {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = Span::new(start, self.cursor.pos());
                    self.diags.emit("E002", span, &[]);
                    self.push(TokenKind::Str, value, span);
                    return;
                }
                Some('"') => {
                    self.cursor.advance();
                    let span = Span::new(start, self.cursor.pos());
                    self.push(TokenKind::Str, value, span);
                    return;
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some(other) => {
                            // Unknown escapes pass through verbatim.
                            value.push('\\');
                            value.push(other);
                        }
                        None => {}
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Numbers ────────────────────────────────────────────────────────

    fn lex_number(&mut self, start: Position) {
        let mut text = self.cursor.eat_while(|c| c.is_ascii_digit());
        let is_float = self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.cursor.advance();
            text.push('.');
            text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
        } else if self.cursor.peek() == Some('L') {
            self.cursor.advance();
            text.push('L');
        }
        // A second decimal point or a trailing identifier character makes
        // the whole run one invalid literal.
        let second_dot = self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit());
        let trailing_word = self.cursor.peek().is_some_and(is_word_continue);
        if second_dot || trailing_word {
            let junk = self
                .cursor
                .eat_while(|c| is_word_continue(c) || c == '.');
            text.push_str(&junk);
            let span = Span::new(start, self.cursor.pos());
            self.diags.emit("E003", span, &[("text", text.clone())]);
            self.push_trivia(TokenKind::Error, text, span);
            return;
        }
        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        self.push(kind, text, Span::new(start, self.cursor.pos()));
    }

    // ── Words ──────────────────────────────────────────────────────────

    fn lex_word(&mut self, start: Position) {
        let text = self.cursor.eat_while(is_word_continue);
        let span = Span::new(start, self.cursor.pos());
        let kind = match self.lexicon.classify(&text) {
            lexicon::WordClass::Keyword(_) => TokenKind::Keyword,
            lexicon::WordClass::Bool(_) => TokenKind::Bool,
            lexicon::WordClass::Ident => TokenKind::Ident,
            lexicon::WordClass::TypeIdent => TokenKind::TypeIdent,
        };
        // Tokens keep their source spelling; keyword matching downstream is
        // case-insensitive and the translator handles other lexicons.
        self.push(kind, text, span);
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ── Lossless reconstruction ────────────────────────────────────────────

/// Rebuild canonical source text from a token stream, trivia included.
///
/// For every canonical input, `reconstruct(lex(src)) == src`. Layout
/// tokens carry no text; the token spans drive line breaks and padding.
pub fn reconstruct(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut line = 1u32;
    let mut col = 1u32;
    for tok in tokens {
        while line < tok.span.start.line {
            out.push('\n');
            line += 1;
            col = 1;
        }
        let has_text = !matches!(
            tok.kind,
            TokenKind::Newline
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::Blank
                | TokenKind::Eof
        );
        if !has_text {
            continue;
        }
        while col < tok.span.start.col {
            out.push(' ');
            col += 1;
        }
        match tok.kind {
            TokenKind::Str => out.push_str(&encode_string(&tok.text)),
            _ => out.push_str(&tok.text),
        }
        line = tok.span.end.line;
        col = tok.span.end.col;
    }
    out
}

/// Re-encode a decoded string literal with the standard escapes.
fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_common::token::Channel;

    fn lex_ok(src: &str) -> Vec<Token> {
        let mut diags = Diagnostics::new();
        let tokens = lex(src, &Lexicon::english(), &mut diags);
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags.entries());
        tokens
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens
            .iter()
            .filter(|t| t.channel == Channel::Main)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_declaration() {
        let tokens = lex_ok("Module demo.\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[0].text, "Module");
    }

    #[test]
    fn spans_are_one_based_line_col() {
        let tokens = lex_ok("Let x be 1.\n");
        // `x` occupies column 5.
        assert_eq!(tokens[1].span.start, Position::new(1, 5));
        assert_eq!(tokens[1].span.end, Position::new(1, 6));
    }

    #[test]
    fn indent_dedent_are_balanced() {
        let src = "Rule a:\n  Return 1.\nRule b:\n  Return 2.\n";
        let tokens = lex_ok(src);
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn deep_nesting_closes_all_levels() {
        let mut src = String::from("a:\n");
        for depth in 1..=64 {
            for _ in 0..depth {
                src.push(' ');
            }
            src.push_str("x.\n");
        }
        let mut diags = Diagnostics::new();
        let tokens = lex(&src, &Lexicon::english(), &mut diags);
        assert!(diags.is_empty());
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, 64);
        assert_eq!(indents, dedents);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn inconsistent_dedent_is_reported_and_stays_balanced() {
        let src = "a:\n    b.\n  c.\n";
        let mut diags = Diagnostics::new();
        let tokens = lex(src, &Lexicon::english(), &mut diags);
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E005");
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, dedents);
    }

    #[test]
    fn comments_and_blanks_ride_the_trivia_channel() {
        let src = "// header\nModule demo.\n\nRule a: // tail\n  Return 1.\n";
        let tokens = lex_ok(src);
        let trivia: Vec<_> = tokens
            .iter()
            .filter(|t| t.channel == Channel::Trivia)
            .collect();
        assert_eq!(trivia.len(), 3);
        assert_eq!(trivia[0].kind, TokenKind::Comment);
        assert_eq!(trivia[0].text, "// header");
        assert_eq!(trivia[1].kind, TokenKind::Blank);
        assert_eq!(trivia[2].text, "// tail");
        // Trivia never reaches the main channel.
        assert!(kinds(&tokens).iter().all(|k| *k != TokenKind::Comment));
    }

    #[test]
    fn string_literals_decode_escapes() {
        let tokens = lex_ok("Let x be \"a\\n\\\"b\\\\\".\n");
        let s = tokens.iter().find(|t| t.kind == TokenKind::Str).unwrap();
        assert_eq!(s.text, "a\n\"b\\");
    }

    #[test]
    fn unterminated_string_reports_once_and_resyncs() {
        let src = "Let x be \"oops.\nReturn 1.\n";
        let mut diags = Diagnostics::new();
        let tokens = lex(src, &Lexicon::english(), &mut diags);
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E002");
        // The next line lexes normally.
        assert!(tokens.iter().any(|t| t.is_kw("return")));
    }

    #[test]
    fn numbers() {
        let tokens = lex_ok("Let a be 42. Let b be 42L. Let c be 3.14.\n");
        let nums: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Int | TokenKind::Float))
            .collect();
        assert_eq!(nums[0].kind, TokenKind::Int);
        assert_eq!(nums[0].text, "42");
        assert_eq!(nums[1].kind, TokenKind::Int);
        assert_eq!(nums[1].text, "42L");
        assert_eq!(nums[2].kind, TokenKind::Float);
        assert_eq!(nums[2].text, "3.14");
    }

    #[test]
    fn qualified_name_dot_is_not_a_decimal_point() {
        let tokens = lex_ok("Io.print(x).\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::TypeIdent,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn invalid_number_is_one_diagnostic() {
        let src = "Let x be 1.2.3.\n";
        let mut diags = Diagnostics::new();
        lex(src, &Lexicon::english(), &mut diags);
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E003");
        assert!(entries[0].message.contains("1.2.3"));
    }

    #[test]
    fn stray_character_reports_and_resyncs() {
        let src = "Let x be @junk here\nReturn 1.\n";
        let mut diags = Diagnostics::new();
        let tokens = lex(src, &Lexicon::english(), &mut diags);
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E004");
        assert!(entries[0].fix_it.is_none());
        assert!(tokens.iter().any(|t| t.is_kw("return")));
    }

    #[test]
    fn stray_semicolon_suggests_a_period() {
        let src = "Return 1;\n";
        let mut diags = Diagnostics::new();
        lex(src, &Lexicon::english(), &mut diags);
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E004");
        let fix = entries[0].fix_it.as_ref().expect("fix-it for `;`");
        assert_eq!(fix.replacement, ".");
    }

    #[test]
    fn bool_literals() {
        let tokens = lex_ok("Let x be true.\n");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Bool && t.text == "true"));
    }

    #[test]
    fn reconstruct_is_lossless() {
        let cases = [
            "Module demo.\n",
            "// header\nModule demo.\n\nRule greet given name: Text, produce Text:\n  Return name. // tail\n",
            "Define User has name required, age between 18 and 120.\n",
            "Rule a:\n  If flag:\n    Return 1.\n  Otherwise:\n    Return 2.\n",
            "Let s be \"a\\nb\".\n",
            "no trailing newline.",
        ];
        for src in cases {
            let mut diags = Diagnostics::new();
            let canonical = canon::canonicalize(src.as_bytes(), &mut diags);
            let tokens = lex(&canonical, &Lexicon::english(), &mut diags);
            assert!(diags.is_empty(), "{src:?}");
            assert_eq!(reconstruct(&tokens), canonical, "not lossless for {src:?}");
        }
    }

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = lex_ok("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
