//! Parser core: token navigation, error reporting, recovery.
//!
//! The grammar lives in the sibling modules: [`items`] for declarations,
//! [`stmts`] for statements, [`expressions`] for expressions and patterns,
//! [`types`] for type expressions and constraints.

mod expressions;
mod items;
mod stmts;
mod types;

use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use aster_common::span::Span;
use aster_common::token::{Channel, Token, TokenKind};
use rustc_hash::FxHashSet;

use crate::ast;

/// Parse a token stream into a module.
///
/// Total: always returns a `Module`, possibly partial, alongside whatever
/// diagnostics were emitted. Callers decide what an empty diagnostic list
/// means.
pub fn parse(tokens: Vec<Token>, diags: &mut Diagnostics) -> ast::Module {
    let main: Vec<Token> = tokens
        .into_iter()
        .filter(|t| t.channel == Channel::Main)
        .collect();
    let mut parser = Parser {
        tokens: main,
        pos: 0,
        diags,
        declared_types: FxHashSet::default(),
        type_vars: FxHashSet::default(),
        effect_vars: FxHashSet::default(),
        collecting_effects: Vec::new(),
    };
    let module = parser.parse_module();
    log::debug!(
        "parsed module `{}` with {} declaration(s)",
        module.name.dotted(),
        module.decls.len()
    );
    module
}

pub(crate) struct Parser<'d> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) diags: &'d mut Diagnostics,
    /// Type names seen so far (scalars are implicit; the typechecker owns
    /// full resolution). Used to classify type-variable-like names.
    pub(crate) declared_types: FxHashSet<String>,
    /// Type variables of the header currently being parsed.
    pub(crate) type_vars: FxHashSet<String>,
    /// Effect variables of the header currently being parsed.
    pub(crate) effect_vars: FxHashSet<String>,
    /// Effects collected so far on the current function header; nested
    /// function types without their own `performs` clause inherit these.
    pub(crate) collecting_effects: Vec<Effect>,
}

impl Parser<'_> {
    // ── Navigation ─────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn at_kw(&self, kw: &str) -> bool {
        self.current().is_kw(kw)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    /// Consume and return the current token.
    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.current().clone();
        self.advance();
        tok
    }

    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token (or the current one when
    /// nothing has been consumed yet).
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.current().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    /// Skip any run of newline tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    // ── Expectations ───────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error_expected(what);
            false
        }
    }

    pub(crate) fn expect_kw(&mut self, kw: &str) -> bool {
        if self.at_kw(kw) {
            self.advance();
            true
        } else {
            self.error_expected(&format!("`{kw}`"));
            false
        }
    }

    /// The sentence terminator.
    pub(crate) fn expect_dot(&mut self) -> bool {
        self.expect(TokenKind::Dot, "`.`")
    }

    /// Emit an `E001` for the current token without consuming it.
    pub(crate) fn error_expected(&mut self, expected: &str) {
        let tok = self.current().clone();
        let actual = match tok.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indent".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            _ => format!("`{}`", tok.text),
        };
        self.diags.emit(
            "E001",
            tok.span,
            &[("expected", expected.to_string()), ("actual", actual)],
        );
    }

    // ── Recovery ───────────────────────────────────────────────────────

    /// Skip to the next declaration boundary: a `Module`/`Rule`/`Define`/
    /// `Use` keyword at column 1, or end of input.
    pub(crate) fn sync_to_decl(&mut self) {
        while !self.at_eof() {
            let tok = self.current();
            let at_boundary = tok.span.start.col == 1
                && (tok.is_kw("module")
                    || tok.is_kw("rule")
                    || tok.is_kw("define")
                    || tok.is_kw("use"));
            if at_boundary {
                return;
            }
            self.advance();
        }
    }

    /// Skip to just past the end of the current sentence (the next `.`),
    /// stopping early at line boundaries.
    pub(crate) fn sync_to_sentence_end(&mut self) {
        while !self.at_eof() {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    return;
                }
                TokenKind::Newline | TokenKind::Dedent => return,
                _ => self.advance(),
            }
        }
    }

    // ── Names ──────────────────────────────────────────────────────────

    /// Parse a qualified name. Dots join segments only when they are
    /// adjacent on both sides, so the sentence terminator never gets
    /// swallowed (`demo.utils.` is two segments and a terminator).
    pub(crate) fn parse_qualified_name(&mut self) -> Option<ast::QualifiedName> {
        if !matches!(self.current().kind, TokenKind::Ident | TokenKind::TypeIdent) {
            self.error_expected("a name");
            return None;
        }
        let first = self.bump();
        let mut span = first.span;
        let mut parts = vec![first.text];
        while self.at(TokenKind::Dot)
            && self.current().span.start == span.end
            && matches!(self.nth(1).kind, TokenKind::Ident | TokenKind::TypeIdent)
            && self.nth(1).span.start == self.current().span.end
        {
            self.advance(); // dot
            let part = self.bump();
            span = span.merge(part.span);
            parts.push(part.text);
        }
        Some(ast::QualifiedName { parts, span })
    }

    /// Parse a plain lowercase identifier.
    pub(crate) fn parse_ident(&mut self, what: &str) -> Option<(String, Span)> {
        if self.at(TokenKind::Ident) {
            let tok = self.bump();
            Some((tok.text, tok.span))
        } else {
            self.error_expected(what);
            None
        }
    }
}
