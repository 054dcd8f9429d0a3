//! Type expression and constraint parsers.

use aster_common::token::{Token, TokenKind};

use super::Parser;
use crate::ast;

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> ast::TypeExpr {
        let start = self.span();
        if self.at(TokenKind::TypeIdent) {
            let tok = self.bump();
            return self.parse_named_type(tok);
        }
        if self.at_kw("rule") {
            return self.parse_func_type();
        }
        self.error_expected("a type");
        if !matches!(
            self.current().kind,
            TokenKind::Dot | TokenKind::Colon | TokenKind::Comma | TokenKind::Newline | TokenKind::Eof
        ) {
            self.advance();
        }
        ast::TypeExpr::Error { span: start }
    }

    /// A type that begins with an uppercase name: builtin container, user
    /// generic application, type variable, or plain name.
    fn parse_named_type(&mut self, tok: Token) -> ast::TypeExpr {
        let start = tok.span;
        match tok.text.as_str() {
            "List" => {
                self.expect_kw("of");
                let item = self.parse_type();
                let span = start.merge(item.span());
                ast::TypeExpr::List {
                    item: Box::new(item),
                    span,
                }
            }
            "Map" => {
                self.expect_kw("of");
                let key = self.parse_type();
                self.expect_kw("to");
                let value = self.parse_type();
                let span = start.merge(value.span());
                ast::TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span,
                }
            }
            "Option" => {
                self.expect_kw("of");
                let item = self.parse_type();
                let span = start.merge(item.span());
                ast::TypeExpr::Option {
                    item: Box::new(item),
                    span,
                }
            }
            "Maybe" => {
                self.expect_kw("of");
                let item = self.parse_type();
                let span = start.merge(item.span());
                ast::TypeExpr::Maybe {
                    item: Box::new(item),
                    span,
                }
            }
            "Result" => {
                self.expect_kw("of");
                let ok = self.parse_type();
                self.expect_kw("or");
                let err = self.parse_type();
                let span = start.merge(err.span());
                ast::TypeExpr::Result {
                    ok: Box::new(ok),
                    err: Box::new(err),
                    span,
                }
            }
            "Pii" => {
                self.expect_kw("of");
                let item = self.parse_type();
                let span = start.merge(item.span());
                ast::TypeExpr::Pii {
                    item: Box::new(item),
                    span,
                }
            }
            name => {
                if self.at_kw("of") {
                    self.advance();
                    let mut args = vec![self.parse_type()];
                    while (self.at(TokenKind::Comma) || self.at_kw("and"))
                        && type_starts(self.nth(1))
                    {
                        self.advance();
                        args.push(self.parse_type());
                    }
                    let span = start.merge(args.last().map(|a| a.span()).unwrap_or(start));
                    ast::TypeExpr::App {
                        base: name.to_string(),
                        args,
                        span,
                    }
                } else if self.type_vars.contains(name) {
                    ast::TypeExpr::Var {
                        name: name.to_string(),
                        span: start,
                    }
                } else {
                    ast::TypeExpr::Name {
                        name: name.to_string(),
                        span: start,
                    }
                }
            }
        }
    }

    /// `rule [given T1 and T2] produce R [performs effects]`
    ///
    /// A function type without its own `performs` clause inherits the
    /// effects collected so far on the enclosing rule header.
    fn parse_func_type(&mut self) -> ast::TypeExpr {
        let start = self.span();
        self.advance(); // rule
        let mut params = Vec::new();
        if self.at_kw("given") {
            self.advance();
            params.push(self.parse_type());
            while (self.at(TokenKind::Comma) || self.at_kw("and")) && type_starts(self.nth(1)) {
                self.advance();
                params.push(self.parse_type());
            }
        }
        self.expect_kw("produce");
        let ret = self.parse_type();
        let effects = if self.at_kw("performs") {
            self.advance();
            self.parse_effect_list()
        } else {
            self.collecting_effects.clone()
        };
        let span = start.merge(self.prev_span());
        ast::TypeExpr::Func {
            params,
            ret: Box::new(ret),
            effects,
            span,
        }
    }

    // ── Constraints ────────────────────────────────────────────────────

    /// Zero or more constraints. A connecting `and`/`,` continues the
    /// list only when the next significant token is a constraint keyword;
    /// otherwise it belongs to the enclosing field list.
    pub(crate) fn parse_constraints(&mut self) -> Vec<ast::Constraint> {
        let mut constraints = Vec::new();
        loop {
            if self.at_kw("required") {
                self.advance();
                constraints.push(ast::Constraint::Required);
            } else if self.at_kw("between") {
                self.advance();
                let min = self.parse_bound();
                self.expect_kw("and");
                let max = self.parse_bound();
                constraints.push(ast::Constraint::Range { min, max });
            } else if self.at_kw("at") {
                self.advance();
                if self.at_kw("least") {
                    self.advance();
                    let min = self.parse_bound();
                    constraints.push(ast::Constraint::Range { min, max: None });
                } else if self.at_kw("most") {
                    self.advance();
                    let max = self.parse_bound();
                    constraints.push(ast::Constraint::Range { min: None, max });
                } else {
                    self.error_expected("`least` or `most`");
                }
            } else if self.at_kw("matching") {
                self.advance();
                if self.at_kw("pattern") {
                    self.advance();
                }
                if self.at(TokenKind::Str) {
                    let tok = self.bump();
                    constraints.push(ast::Constraint::Pattern { regexp: tok.text });
                } else {
                    self.error_expected("a pattern string");
                }
            } else {
                break;
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and")) && is_constraint_kw(self.nth(1)) {
                self.advance();
            } else {
                break;
            }
        }
        merge_ranges(constraints)
    }

    fn parse_bound(&mut self) -> Option<ast::Number> {
        match self.current().kind {
            TokenKind::Int => {
                let tok = self.bump();
                let digits = tok.text.trim_end_matches('L');
                Some(ast::Number::Int(digits.parse().unwrap_or_default()))
            }
            TokenKind::Float => {
                let tok = self.bump();
                Some(ast::Number::Float(tok.text.parse().unwrap_or_default()))
            }
            _ => {
                self.error_expected("a number");
                None
            }
        }
    }
}

fn type_starts(tok: &Token) -> bool {
    tok.kind == TokenKind::TypeIdent || tok.is_kw("rule")
}

fn is_constraint_kw(tok: &Token) -> bool {
    tok.is_kw("required") || tok.is_kw("between") || tok.is_kw("at") || tok.is_kw("matching")
}

/// Fold all `Range` constraints into one, so `at least X and at most Y`
/// becomes a single `Range{min: X, max: Y}`.
fn merge_ranges(constraints: Vec<ast::Constraint>) -> Vec<ast::Constraint> {
    let range_count = constraints
        .iter()
        .filter(|c| matches!(c, ast::Constraint::Range { .. }))
        .count();
    if range_count <= 1 {
        return constraints;
    }
    let mut merged_min = None;
    let mut merged_max = None;
    let mut out = Vec::with_capacity(constraints.len());
    let mut range_slot = None;
    for constraint in constraints {
        match constraint {
            ast::Constraint::Range { min, max } => {
                if merged_min.is_none() {
                    merged_min = min;
                }
                if merged_max.is_none() {
                    merged_max = max;
                }
                if range_slot.is_none() {
                    range_slot = Some(out.len());
                    out.push(ast::Constraint::Range {
                        min: None,
                        max: None,
                    });
                }
            }
            other => out.push(other),
        }
    }
    if let Some(slot) = range_slot {
        out[slot] = ast::Constraint::Range {
            min: merged_min,
            max: merged_max,
        };
    }
    out
}
