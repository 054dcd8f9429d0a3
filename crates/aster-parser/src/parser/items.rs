//! Declaration parsers.
//!
//! Every declaration begins with a recognizable leading keyword at column
//! one: `Module`, `Use`, `Define`, or `Rule`. On an unexpected token the
//! parser reports it and synchronizes to the next declaration boundary,
//! returning an `Error` placeholder so callers still get a partial module.

use aster_common::effect::Effect;
use aster_common::span::Span;
use aster_common::token::TokenKind;

use super::Parser;
use crate::ast;
use crate::infer;

impl Parser<'_> {
    pub(crate) fn parse_module(&mut self) -> ast::Module {
        self.skip_newlines();
        let start = self.span();
        let name = if self.at_kw("module") {
            self.advance();
            let name = self.parse_qualified_name().unwrap_or(ast::QualifiedName {
                parts: Vec::new(),
                span: start,
            });
            self.expect_dot();
            name
        } else {
            self.error_expected("`Module`");
            ast::QualifiedName {
                parts: Vec::new(),
                span: start,
            }
        };

        let mut decls = Vec::new();
        let mut end = self.span();
        loop {
            self.skip_newlines();
            if self.at_eof() {
                break;
            }
            // Stray layout at the top level is noise, not a declaration.
            if self.at(TokenKind::Indent) || self.at(TokenKind::Dedent) {
                self.advance();
                continue;
            }
            let decl = if self.at_kw("rule") {
                self.parse_rule()
            } else if self.at_kw("define") {
                self.parse_define()
            } else if self.at_kw("use") {
                self.parse_use()
            } else {
                let span = self.span();
                self.error_expected("`Rule`, `Define`, or `Use`");
                self.advance();
                self.sync_to_decl();
                ast::Decl::Error(span)
            };
            end = decl.span();
            decls.push(decl);
        }

        ast::Module {
            name,
            decls,
            span: start.merge(end),
        }
    }

    // ── Use ────────────────────────────────────────────────────────────

    fn parse_use(&mut self) -> ast::Decl {
        let start = self.span();
        self.advance(); // use
        let Some(path) = self.parse_qualified_name() else {
            self.sync_to_sentence_end();
            return ast::Decl::Error(start);
        };
        self.expect_dot();
        let span = start.merge(path.span);
        ast::Decl::Import(ast::Import { path, span })
    }

    // ── Define ─────────────────────────────────────────────────────────

    /// `Define Name has fields.` | `Define Name as one of V, ...` |
    /// `Define Name as Type.`
    fn parse_define(&mut self) -> ast::Decl {
        let start = self.span();
        self.advance(); // define
        if !self.at(TokenKind::TypeIdent) {
            self.error_expected("a type name");
            self.sync_to_decl();
            return ast::Decl::Error(start);
        }
        let name_tok = self.bump();
        let name = name_tok.text;
        self.declared_types.insert(name.clone());

        let type_params = if self.at_kw("of") {
            self.parse_type_param_list()
        } else {
            Vec::new()
        };
        self.type_vars = type_params.iter().cloned().collect();

        let decl = if self.at_kw("has") {
            self.advance();
            let fields = self.parse_field_list();
            let end = self.span();
            self.expect_dot();
            ast::Decl::Data(ast::Data {
                name,
                type_params,
                fields,
                span: start.merge(end),
            })
        } else if self.at_kw("as") {
            self.advance();
            if self.at_kw("one") {
                self.advance();
                self.expect_kw("of");
                let variants = self.parse_variant_list();
                let end = self.span();
                self.expect_dot();
                ast::Decl::Enum(ast::EnumDecl {
                    name,
                    type_params,
                    variants,
                    span: start.merge(end),
                })
            } else {
                let target = self.parse_type();
                let end = self.span();
                self.expect_dot();
                ast::Decl::TypeAlias(ast::TypeAlias {
                    name,
                    target,
                    span: start.merge(end),
                })
            }
        } else {
            self.error_expected("`has` or `as`");
            self.sync_to_sentence_end();
            ast::Decl::Error(start)
        };
        self.type_vars.clear();
        decl
    }

    fn parse_variant_list(&mut self) -> Vec<(String, Span)> {
        let mut variants = Vec::new();
        loop {
            if self.at(TokenKind::TypeIdent) {
                let tok = self.bump();
                variants.push((tok.text, tok.span));
            } else {
                self.error_expected("a variant name");
                break;
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and"))
                && self.nth(1).kind == TokenKind::TypeIdent
            {
                self.advance();
            } else {
                break;
            }
        }
        variants
    }

    // ── Rule ───────────────────────────────────────────────────────────

    /// `Rule name [of T ...] [using E ...] [given params,] produce Type
    /// [, it performs effects]: body`
    fn parse_rule(&mut self) -> ast::Decl {
        let start = self.span();
        self.advance(); // rule
        let Some((name, _)) = self.parse_ident("a rule name") else {
            self.sync_to_decl();
            return ast::Decl::Error(start);
        };

        let type_params = if self.at_kw("of") {
            self.parse_type_param_list()
        } else {
            Vec::new()
        };
        self.type_vars = type_params.iter().cloned().collect();

        let effect_params = if self.at_kw("using") {
            self.parse_effect_param_list()
        } else {
            Vec::new()
        };
        self.effect_vars = effect_params.iter().cloned().collect();

        self.collecting_effects = Vec::new();
        self.maybe_parse_effect_clause();
        if self.at(TokenKind::Comma) && self.nth(1).is_kw("given") {
            self.advance();
        }

        let mut params = Vec::new();
        if self.at_kw("given") {
            self.advance();
            loop {
                match self.parse_field() {
                    Some(field) => params.push(field),
                    None => {
                        self.sync_to_decl();
                        self.type_vars.clear();
                        self.effect_vars.clear();
                        return ast::Decl::Error(start);
                    }
                }
                if self.at(TokenKind::Comma) || self.at_kw("and") {
                    if self.nth(1).is_kw("produce") || self.nth(1).is_kw("it") {
                        self.advance();
                        break;
                    }
                    if self.nth(1).kind == TokenKind::Ident {
                        self.advance();
                        continue;
                    }
                }
                break;
            }
        }

        if self.at(TokenKind::Comma) && self.nth(1).is_kw("produce") {
            self.advance();
        }
        self.expect_kw("produce");
        let ret = self.parse_type();
        self.maybe_parse_effect_clause();

        self.expect(TokenKind::Colon, "`:`");
        let body = self.parse_decl_body();

        let declared_effects = std::mem::take(&mut self.collecting_effects);
        let span = start.merge(body.span);
        self.type_vars.clear();
        self.effect_vars.clear();
        ast::Decl::Func(ast::Func {
            name,
            type_params,
            effect_params,
            params,
            ret,
            declared_effects,
            body,
            span,
        })
    }

    /// `[,] it performs <effects>` -- accepted both before `given` and
    /// after the produce type. Effects parsed here extend the
    /// currently-collecting set, which nested function types inherit.
    fn maybe_parse_effect_clause(&mut self) {
        let at_clause = self.at_kw("it")
            || (self.at(TokenKind::Comma) && self.nth(1).is_kw("it"));
        if !at_clause {
            return;
        }
        if self.at(TokenKind::Comma) {
            self.advance();
        }
        self.advance(); // it
        self.expect_kw("performs");
        let effects = self.parse_effect_list();
        self.collecting_effects.extend(effects);
    }

    /// `of A and B` -- uppercase single-word names by convention.
    pub(crate) fn parse_type_param_list(&mut self) -> Vec<String> {
        self.advance(); // of
        let mut params = Vec::new();
        loop {
            if self.at(TokenKind::TypeIdent) {
                params.push(self.bump().text);
            } else {
                self.error_expected("a type parameter");
                break;
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and"))
                && self.nth(1).kind == TokenKind::TypeIdent
            {
                self.advance();
            } else {
                break;
            }
        }
        params
    }

    /// `using E and F` -- single-capital-letter effect variables.
    fn parse_effect_param_list(&mut self) -> Vec<String> {
        self.advance(); // using
        let mut params = Vec::new();
        loop {
            if self.at(TokenKind::TypeIdent) {
                let tok = self.bump();
                if !is_effect_var_name(&tok.text) {
                    self.error_expected("a single-letter effect variable");
                }
                params.push(tok.text);
            } else {
                self.error_expected("an effect variable");
                break;
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and"))
                && self.nth(1).kind == TokenKind::TypeIdent
            {
                self.advance();
            } else {
                break;
            }
        }
        params
    }

    // ── Fields ─────────────────────────────────────────────────────────

    /// Fields of a `Define ... has` declaration, up to the closing `.`.
    fn parse_field_list(&mut self) -> Vec<ast::Field> {
        let mut fields = Vec::new();
        loop {
            match self.parse_field() {
                Some(field) => fields.push(field),
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
        fields
    }

    /// One field: `name [: Type] [constraints]`. Without a written type
    /// the initial type is inferred from the field name.
    pub(crate) fn parse_field(&mut self) -> Option<ast::Field> {
        let (name, name_span) = self.parse_ident("a field name")?;
        let (ty, type_inferred) = if self.at(TokenKind::Colon) {
            self.advance();
            (self.parse_type(), false)
        } else {
            (infer::initial_type(&name, name_span), true)
        };
        let constraints = self.parse_constraints();
        let span = name_span.merge(self.prev_span());
        Some(ast::Field {
            name,
            ty,
            constraints,
            type_inferred,
            span,
        })
    }

    /// Effect names for `it performs` and `performs` clauses: concrete
    /// effects or declared effect variables.
    pub(crate) fn parse_effect_list(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        loop {
            if self.at(TokenKind::TypeIdent) {
                let tok = self.bump();
                match Effect::from_name(&tok.text) {
                    Some(effect) => effects.push(effect),
                    None if is_effect_var_name(&tok.text) => {
                        effects.push(Effect::Var(tok.text));
                    }
                    None => {
                        self.diags.emit(
                            "E001",
                            tok.span,
                            &[
                                ("expected", "an effect name".to_string()),
                                ("actual", format!("`{}`", tok.text)),
                            ],
                        );
                    }
                }
            } else {
                self.error_expected("an effect name");
                break;
            }
            if (self.at(TokenKind::Comma) || self.at_kw("and"))
                && self.nth(1).kind == TokenKind::TypeIdent
            {
                self.advance();
            } else {
                break;
            }
        }
        effects
    }
}

fn is_effect_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}
