use serde::Serialize;

use crate::span::Span;

/// The channel a token is emitted on.
///
/// The parser only consumes `Main` tokens. Comments and blank-line markers
/// ride on `Trivia` so the lossless reconstruction and future tooling can
/// see them without the grammar knowing they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Channel {
    Main,
    Trivia,
}

/// A token produced by the Aster lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The source text of the token. For keywords this is the canonical
    /// spelling after lexicon lookup is applied case-insensitively; the
    /// keyword translator rewrites it for non-English lexicons.
    pub text: String,
    pub span: Span,
    pub channel: Channel,
}

impl Token {
    /// Create a main-channel token.
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            channel: Channel::Main,
        }
    }

    /// Create a trivia-channel token.
    pub fn trivia(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            channel: Channel::Trivia,
        }
    }

    /// Whether this token is the given keyword (case-insensitive).
    pub fn is_kw(&self, name: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(name)
    }
}

/// Every kind of token in the Aster surface language.
///
/// The punctuation set is deliberately tiny: the CNL uses words where other
/// languages use operator characters, so `: , ( ) .` is the complete list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// A word the active lexicon classifies as a keyword.
    Keyword,
    /// A lowercase-initial identifier.
    Ident,
    /// An uppercase-initial identifier (type or variant name by convention).
    TypeIdent,
    /// Integer literal, including the `L` long suffix form.
    Int,
    /// Floating-point literal.
    Float,
    /// String literal (text excludes the quotes, escapes resolved).
    Str,
    /// `true` or `false`.
    Bool,

    // ── Punctuation ────────────────────────────────────────────────────
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `.` -- both the sentence terminator and the qualified-name separator.
    Dot,

    // ── Layout ─────────────────────────────────────────────────────────
    /// End of a logical line.
    Newline,
    /// Indentation increased relative to the enclosing line.
    Indent,
    /// Indentation decreased; one Dedent per level popped.
    Dedent,

    // ── Trivia ─────────────────────────────────────────────────────────
    /// A `//` comment, including the introducer.
    Comment,
    /// A line containing only whitespace.
    Blank,

    // ── Special ────────────────────────────────────────────────────────
    /// End of input. Always the last token.
    Eof,
    /// Invalid input consumed during error recovery.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_kw_matches_case_insensitively() {
        let tok = Token::new(TokenKind::Keyword, "Module", Span::DUMMY);
        assert!(tok.is_kw("module"));
        assert!(tok.is_kw("Module"));
        assert!(!tok.is_kw("rule"));
    }

    #[test]
    fn is_kw_requires_keyword_kind() {
        let tok = Token::new(TokenKind::Ident, "module", Span::DUMMY);
        assert!(!tok.is_kw("module"));
    }

    #[test]
    fn trivia_constructor_sets_channel() {
        let tok = Token::trivia(TokenKind::Comment, "// hi", Span::DUMMY);
        assert_eq!(tok.channel, Channel::Trivia);
        let tok = Token::new(TokenKind::Ident, "x", Span::DUMMY);
        assert_eq!(tok.channel, Channel::Main);
    }
}
