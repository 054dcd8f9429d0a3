//! Expression and pattern parsers.
//!
//! Pratt-style precedence over word operators:
//! `or` < `and` < `not` < comparisons (`equals to`, `not equals to`,
//! `less than`, `greater than`) < `plus`/`minus` < `times`/`divided by`.
//! `not` is a prefix operator except in the `not equals to` phrase; its
//! operand is a comparison-or-tighter subexpression.

use aster_common::token::TokenKind;

use super::Parser;
use crate::ast::{self, BinOp};

/// Binding powers, low to high.
const BP_OR: u8 = 1;
const BP_AND: u8 = 2;
const BP_CMP: u8 = 3;
const BP_ADD: u8 = 4;
const BP_MUL: u8 = 5;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> ast::Expr {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_bp: u8) -> ast::Expr {
        let mut lhs = self.parse_unary();
        while let Some((op, bp, words)) = self.peek_operator() {
            if bp < min_bp {
                break;
            }
            for _ in 0..words {
                self.advance();
            }
            let rhs = self.parse_binary(bp + 1);
            let span = lhs.span().merge(rhs.span());
            lhs = ast::Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        lhs
    }

    /// The operator at the cursor, with its binding power and word count.
    fn peek_operator(&self) -> Option<(BinOp, u8, usize)> {
        let tok = self.current();
        if tok.is_kw("or") {
            return Some((BinOp::Or, BP_OR, 1));
        }
        if tok.is_kw("and") {
            return Some((BinOp::And, BP_AND, 1));
        }
        if tok.is_kw("equals") {
            let words = if self.nth(1).is_kw("to") { 2 } else { 1 };
            return Some((BinOp::Eq, BP_CMP, words));
        }
        if tok.is_kw("not") && self.nth(1).is_kw("equals") {
            let words = if self.nth(2).is_kw("to") { 3 } else { 2 };
            return Some((BinOp::Ne, BP_CMP, words));
        }
        if tok.is_kw("less") {
            let words = if self.nth(1).is_kw("than") { 2 } else { 1 };
            return Some((BinOp::Lt, BP_CMP, words));
        }
        if tok.is_kw("greater") {
            let words = if self.nth(1).is_kw("than") { 2 } else { 1 };
            return Some((BinOp::Gt, BP_CMP, words));
        }
        if tok.is_kw("plus") {
            return Some((BinOp::Add, BP_ADD, 1));
        }
        if tok.is_kw("minus") {
            return Some((BinOp::Sub, BP_ADD, 1));
        }
        if tok.is_kw("times") {
            return Some((BinOp::Mul, BP_MUL, 1));
        }
        if tok.is_kw("divided") {
            let words = if self.nth(1).is_kw("by") { 2 } else { 1 };
            return Some((BinOp::Div, BP_MUL, words));
        }
        None
    }

    fn parse_unary(&mut self) -> ast::Expr {
        if self.at_kw("not") && !self.nth(1).is_kw("equals") {
            let start = self.span();
            self.advance();
            // `not` sits between `and`/`or` and the comparison tier: its
            // operand is a full comparison-or-tighter subexpression, so
            // `not a equals to b` is not((a equals to b)) while
            // `not a and b` leaves the `and` to the enclosing level.
            let inner = self.parse_binary(BP_CMP);
            let span = start.merge(inner.span());
            return ast::Expr::Not {
                inner: Box::new(inner),
                span,
            };
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ast::Expr {
        let start = self.span();
        match self.current().kind {
            TokenKind::Int => {
                let tok = self.bump();
                if let Some(digits) = tok.text.strip_suffix('L') {
                    ast::Expr::Long {
                        value: parse_int(self, digits, &tok.text, start),
                        span: start,
                    }
                } else {
                    ast::Expr::Int {
                        value: parse_int(self, &tok.text, &tok.text, start),
                        span: start,
                    }
                }
            }
            TokenKind::Float => {
                let tok = self.bump();
                ast::Expr::Double {
                    value: tok.text.parse().unwrap_or_default(),
                    span: start,
                }
            }
            TokenKind::Str => {
                let tok = self.bump();
                ast::Expr::Str {
                    value: tok.text,
                    span: start,
                }
            }
            TokenKind::Bool => {
                let tok = self.bump();
                ast::Expr::Bool {
                    value: tok.text.eq_ignore_ascii_case("true"),
                    span: start,
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, "`)`");
                inner
            }
            TokenKind::Keyword => self.parse_keyword_expr(),
            TokenKind::Ident | TokenKind::TypeIdent => self.parse_name_expr(),
            _ => {
                self.error_expected("an expression");
                // Do not consume terminators; the caller resynchronizes.
                if !matches!(
                    self.current().kind,
                    TokenKind::Dot
                        | TokenKind::Newline
                        | TokenKind::Dedent
                        | TokenKind::Eof
                        | TokenKind::RParen
                        | TokenKind::Comma
                ) {
                    self.advance();
                }
                ast::Expr::Error { span: start }
            }
        }
    }

    fn parse_keyword_expr(&mut self) -> ast::Expr {
        let start = self.span();
        if self.at_kw("nothing") {
            self.advance();
            return ast::Expr::Null { span: start };
        }
        if self.at_kw("none") {
            self.advance();
            return ast::Expr::None { span: start };
        }
        if self.at_kw("ok") || self.at_kw("err") || self.at_kw("some") {
            let tok = self.bump();
            self.expect_kw("of");
            let inner = Box::new(self.parse_unary());
            let span = start.merge(inner.span());
            return if tok.is_kw("ok") {
                ast::Expr::Ok { inner, span }
            } else if tok.is_kw("err") {
                ast::Expr::Err { inner, span }
            } else {
                ast::Expr::Some { inner, span }
            };
        }
        if self.at_kw("given") {
            return self.parse_lambda();
        }
        if self.at_kw("if") {
            return self.parse_if_expr();
        }
        if self.at_kw("match") {
            return self.parse_match_expr();
        }
        self.error_expected("an expression");
        self.advance();
        ast::Expr::Error { span: start }
    }

    /// `given x and y produce body`
    fn parse_lambda(&mut self) -> ast::Expr {
        let start = self.span();
        self.advance(); // given
        let mut params = Vec::new();
        loop {
            match self.parse_ident("a parameter name") {
                Some(param) => params.push(param),
                None => break,
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and"))
                && self.nth(1).kind == TokenKind::Ident
            {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kw("produce");
        let body = self.parse_expr();
        let span = start.merge(body.span());
        ast::Expr::Lambda {
            params,
            body: Box::new(body),
            span,
        }
    }

    /// `if cond then a otherwise b`
    fn parse_if_expr(&mut self) -> ast::Expr {
        let start = self.span();
        self.advance(); // if
        let cond = self.parse_expr();
        self.expect_kw("then");
        let then_value = self.parse_expr();
        self.expect_kw("otherwise");
        let else_value = self.parse_expr();
        let span = start.merge(else_value.span());
        ast::Expr::If {
            cond: Box::new(cond),
            then_value: Box::new(then_value),
            else_value: Box::new(else_value),
            span,
        }
    }

    /// `match e when p then e1, ... [otherwise e]`
    fn parse_match_expr(&mut self) -> ast::Expr {
        let start = self.span();
        self.advance(); // match
        let scrutinee = self.parse_expr();
        let mut arms = Vec::new();
        let mut default = None;
        loop {
            if self.at_kw("when") {
                self.advance();
                let pattern = self.parse_pattern();
                self.expect_kw("then");
                let value = self.parse_expr();
                arms.push((pattern, value));
            } else if self.at_kw("otherwise") {
                self.advance();
                default = Some(Box::new(self.parse_expr()));
                break;
            } else {
                break;
            }
            if self.at(TokenKind::Comma)
                && (self.nth(1).is_kw("when") || self.nth(1).is_kw("otherwise"))
            {
                self.advance();
            }
        }
        if arms.is_empty() && default.is_none() {
            self.error_expected("`when`");
        }
        let span = start.merge(self.prev_span());
        ast::Expr::Match {
            scrutinee: Box::new(scrutinee),
            arms,
            default,
            span,
        }
    }

    /// Name-led expressions: plain names, qualified names, calls, and
    /// `Type with field: value, ...` construction.
    fn parse_name_expr(&mut self) -> ast::Expr {
        let leading_type_ident = self.at(TokenKind::TypeIdent);
        let Some(name) = self.parse_qualified_name() else {
            return ast::Expr::Error { span: self.span() };
        };
        let start = name.span;
        if self.at(TokenKind::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !self.at(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr());
                    if self.at(TokenKind::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)`");
            let span = start.merge(self.prev_span());
            return ast::Expr::Call {
                callee: name,
                args,
                span,
            };
        }
        if leading_type_ident && !name.is_qualified() && self.at_kw("with") {
            self.advance();
            let mut fields = Vec::new();
            loop {
                let Some((field, _)) = self.parse_ident("a field name") else {
                    break;
                };
                self.expect(TokenKind::Colon, "`:`");
                let value = self.parse_expr();
                fields.push((field, value));
                if self.at(TokenKind::Comma)
                    && self.nth(1).kind == TokenKind::Ident
                    && self.nth(2).kind == TokenKind::Colon
                {
                    self.advance();
                } else {
                    break;
                }
            }
            let span = start.merge(self.prev_span());
            return ast::Expr::Construct {
                ty: name.parts[0].clone(),
                fields,
                span,
            };
        }
        ast::Expr::Name {
            name: name.dotted(),
            span: name.span,
        }
    }

    // ── Patterns ───────────────────────────────────────────────────────

    pub(crate) fn parse_pattern(&mut self) -> ast::Pattern {
        let start = self.span();
        match self.current().kind {
            TokenKind::Int => {
                let tok = self.bump();
                let digits = tok.text.trim_end_matches('L');
                ast::Pattern::Int {
                    value: digits.parse().unwrap_or_default(),
                    span: start,
                }
            }
            TokenKind::Str => {
                let tok = self.bump();
                ast::Pattern::Str {
                    value: tok.text,
                    span: start,
                }
            }
            TokenKind::Bool => {
                let tok = self.bump();
                ast::Pattern::Bool {
                    value: tok.text.eq_ignore_ascii_case("true"),
                    span: start,
                }
            }
            TokenKind::Keyword => {
                for (kw, canonical) in [("some", "Some"), ("ok", "Ok"), ("err", "Err")] {
                    if self.at_kw(kw) {
                        self.advance();
                        self.expect_kw("of");
                        let bind = self.parse_ident("a binding name").map(|(name, _)| name);
                        let span = start.merge(self.prev_span());
                        return ast::Pattern::Variant {
                            name: canonical.to_string(),
                            bind,
                            span,
                        };
                    }
                }
                if self.at_kw("none") {
                    self.advance();
                    return ast::Pattern::Variant {
                        name: "None".to_string(),
                        bind: None,
                        span: start,
                    };
                }
                self.error_expected("a pattern");
                self.advance();
                ast::Pattern::Wildcard { span: start }
            }
            TokenKind::TypeIdent => {
                let tok = self.bump();
                let bind = if self.at_kw("of") {
                    self.advance();
                    self.parse_ident("a binding name").map(|(name, _)| name)
                } else {
                    None
                };
                let span = start.merge(self.prev_span());
                ast::Pattern::Variant {
                    name: tok.text,
                    bind,
                    span,
                }
            }
            TokenKind::Ident => {
                let tok = self.bump();
                ast::Pattern::Bind {
                    name: tok.text,
                    span: start,
                }
            }
            _ => {
                self.error_expected("a pattern");
                self.advance();
                ast::Pattern::Wildcard { span: start }
            }
        }
    }
}

fn parse_int(
    parser: &mut Parser<'_>,
    digits: &str,
    original: &str,
    span: aster_common::span::Span,
) -> i64 {
    match digits.parse() {
        Ok(value) => value,
        Err(_) => {
            parser
                .diags
                .emit("E003", span, &[("text", original.to_string())]);
            0
        }
    }
}
