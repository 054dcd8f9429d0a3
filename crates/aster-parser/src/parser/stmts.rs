//! Statement and block parsers.
//!
//! Bodies come in two shapes. A declaration body (or `Workflow`/match-arm
//! body) is either inline -- sentences on the same logical line -- or an
//! indented block. Branch bodies (`If`/`Otherwise`/`Try`/`Catch`) are
//! exactly one sentence when inline, which keeps the statement after an
//! inline `Otherwise:` outside the conditional.

use aster_common::token::TokenKind;

use super::Parser;
use crate::ast;

impl Parser<'_> {
    /// Body of a declaration, `Workflow`, or match arm: inline sentences
    /// or an indented block.
    pub(crate) fn parse_decl_body(&mut self) -> ast::Block {
        if self.at(TokenKind::Newline) {
            self.parse_indented_block()
        } else {
            self.parse_inline_stmts()
        }
    }

    /// Branch body: an indented block, or exactly one inline sentence.
    pub(crate) fn parse_branch_body(&mut self) -> ast::Block {
        if self.at(TokenKind::Newline) {
            self.parse_indented_block()
        } else {
            let start = self.span();
            let stmt = self.parse_stmt();
            let span = start.merge(stmt.span());
            ast::Block {
                stmts: vec![stmt],
                span,
            }
        }
    }

    fn parse_inline_stmts(&mut self) -> ast::Block {
        let start = self.span();
        let mut stmts = Vec::new();
        while !matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        ) && !self.at_kw("otherwise")
            && !self.at_kw("catch")
            && !self.at_kw("when")
        {
            stmts.push(self.parse_stmt());
        }
        let span = match stmts.last() {
            Some(last) => start.merge(last.span()),
            None => start,
        };
        ast::Block { stmts, span }
    }

    fn parse_indented_block(&mut self) -> ast::Block {
        self.skip_newlines();
        let start = self.span();
        if !self.expect(TokenKind::Indent, "an indented block") {
            return ast::Block {
                stmts: Vec::new(),
                span: start,
            };
        }
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Dedent) {
                self.advance();
                break;
            }
            if self.at_eof() {
                break;
            }
            stmts.push(self.parse_stmt());
        }
        let span = match stmts.last() {
            Some(last) => start.merge(last.span()),
            None => start,
        };
        ast::Block { stmts, span }
    }

    // ── Statements ─────────────────────────────────────────────────────

    pub(crate) fn parse_stmt(&mut self) -> ast::Stmt {
        if self.at_kw("let") {
            self.parse_let()
        } else if self.at_kw("return") {
            self.parse_return()
        } else if self.at_kw("if") {
            self.parse_if()
        } else if self.at_kw("match") {
            self.parse_match()
        } else if self.at_kw("start") {
            self.parse_start()
        } else if self.at_kw("wait") {
            self.parse_wait()
        } else if self.at_kw("try") {
            self.parse_try()
        } else if self.at_kw("workflow") {
            self.parse_workflow()
        } else {
            self.parse_expr_stmt()
        }
    }

    /// `Let name be expr.`
    fn parse_let(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        let Some((name, _)) = self.parse_ident("a binding name") else {
            self.sync_to_sentence_end();
            return ast::Stmt::Error { span: start };
        };
        self.expect_kw("be");
        let value = self.parse_expr();
        self.expect_dot();
        let span = start.merge(self.prev_span());
        ast::Stmt::Let { name, value, span }
    }

    /// `Return.` | `Return expr.`
    fn parse_return(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        let value = if self.at(TokenKind::Dot) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect_dot();
        let span = start.merge(self.prev_span());
        ast::Stmt::Return { value, span }
    }

    /// `If cond: branch [Otherwise: branch]`
    fn parse_if(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        let cond = self.parse_expr();
        self.expect(TokenKind::Colon, "`:`");
        let then_block = self.parse_branch_body();
        let else_block = if self.at_kw("otherwise") {
            self.advance();
            self.expect(TokenKind::Colon, "`:`");
            Some(self.parse_branch_body())
        } else {
            None
        };
        let end = else_block
            .as_ref()
            .map(|b| b.span)
            .unwrap_or(then_block.span);
        ast::Stmt::If {
            cond,
            then_block,
            else_block,
            span: start.merge(end),
        }
    }

    /// `Match expr: When pattern: branch ... [Otherwise: branch]`
    fn parse_match(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        let scrutinee = self.parse_expr();
        self.expect(TokenKind::Colon, "`:`");

        let mut arms = Vec::new();
        if self.at(TokenKind::Newline) {
            // Block form: arms sit one indent level in.
            self.skip_newlines();
            self.expect(TokenKind::Indent, "an indented block of arms");
            loop {
                self.skip_newlines();
                if self.at(TokenKind::Dedent) {
                    self.advance();
                    break;
                }
                if self.at_eof() {
                    break;
                }
                match self.parse_arm() {
                    Some(arm) => arms.push(arm),
                    None => break,
                }
            }
        } else {
            // Inline form: arms follow on the same logical line.
            while self.at_kw("when") || self.at_kw("otherwise") {
                match self.parse_arm() {
                    Some(arm) => arms.push(arm),
                    None => break,
                }
            }
        }
        if arms.is_empty() {
            self.error_expected("`When`");
        }
        let end = arms.last().map(|a| a.span).unwrap_or(start);
        ast::Stmt::Match {
            scrutinee,
            arms,
            span: start.merge(end),
        }
    }

    /// `When pattern: branch` | `Otherwise: branch`
    fn parse_arm(&mut self) -> Option<ast::MatchArm> {
        let start = self.span();
        let pattern = if self.at_kw("otherwise") {
            self.advance();
            ast::Pattern::Wildcard { span: start }
        } else if self.at_kw("when") {
            self.advance();
            self.parse_pattern()
        } else {
            self.error_expected("`When` or `Otherwise`");
            return None;
        };
        self.expect(TokenKind::Colon, "`:`");
        let body = self.parse_branch_body();
        let span = start.merge(body.span);
        Some(ast::MatchArm {
            pattern,
            body,
            span,
        })
    }

    /// `Start task as async call.`
    fn parse_start(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        let Some((task, _)) = self.parse_ident("a task name") else {
            self.sync_to_sentence_end();
            return ast::Stmt::Error { span: start };
        };
        self.expect_kw("as");
        self.expect_kw("async");
        let call = self.parse_expr();
        self.expect_dot();
        let span = start.merge(self.prev_span());
        ast::Stmt::Start { task, call, span }
    }

    /// `Wait for task.`
    fn parse_wait(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        self.expect_kw("for");
        let Some((task, _)) = self.parse_ident("a task name") else {
            self.sync_to_sentence_end();
            return ast::Stmt::Error { span: start };
        };
        self.expect_dot();
        let span = start.merge(self.prev_span());
        ast::Stmt::Wait { task, span }
    }

    /// `Try: branch Catch name: branch`
    fn parse_try(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        self.expect(TokenKind::Colon, "`:`");
        let body = self.parse_branch_body();
        self.skip_newlines();
        self.expect_kw("catch");
        let (catch_name, _) = self
            .parse_ident("a catch binding")
            .unwrap_or_else(|| ("error".to_string(), start));
        self.expect(TokenKind::Colon, "`:`");
        let handler = self.parse_branch_body();
        let span = start.merge(handler.span);
        ast::Stmt::Try {
            body,
            catch_name,
            handler,
            span,
        }
    }

    /// `Workflow: body`
    fn parse_workflow(&mut self) -> ast::Stmt {
        let start = self.span();
        self.advance();
        self.expect(TokenKind::Colon, "`:`");
        let body = self.parse_decl_body();
        let span = start.merge(body.span);
        ast::Stmt::Workflow { body, span }
    }

    fn parse_expr_stmt(&mut self) -> ast::Stmt {
        let start = self.span();
        let expr = self.parse_expr();
        if matches!(expr, ast::Expr::Error { .. }) {
            self.sync_to_sentence_end();
            return ast::Stmt::Error { span: start };
        }
        self.expect_dot();
        let span = start.merge(self.prev_span());
        ast::Stmt::Expr { expr, span }
    }
}
