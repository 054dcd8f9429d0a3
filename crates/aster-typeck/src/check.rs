//! The checking driver.
//!
//! Runs over a Core IR module in phases: collect declarations (structural
//! checks, signatures, aliases), check each function body (scopes, types,
//! call conformance) while recording call sites, then the call-site
//! passes: effect inference, PII flow, capability enforcement, and the
//! async scheduling analysis. `Error` placeholder subtrees are skipped
//! without further diagnostics.

use std::collections::BTreeSet;

use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use aster_common::span::Span;
use aster_ir::ir;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::aliases::AliasMap;
use crate::scope::{ScopeId, ScopeKind, ScopeTree, SymbolInfo, SymbolKind};
use crate::unify::{self, Subst, UnifyError};
use crate::{asyncck, builtins, caps, effects, generics, Options};

/// Scalar type names known without declaration.
const SCALARS: &[&str] = &["Text", "Int", "Long", "Double", "Bool", "DateTime", "Nothing"];

#[derive(Debug, Clone)]
pub(crate) struct FuncSig {
    pub type_params: Vec<String>,
    pub params: Vec<ir::Type>,
    pub ret: ir::Type,
    pub declared_effects: Vec<Effect>,
    pub span: Span,
}

#[derive(Debug, Clone)]
struct DataDef {
    type_params: Vec<String>,
    fields: Vec<(String, ir::Type)>,
}

/// One checked call, recorded for the effect, PII, and capability passes.
#[derive(Debug, Clone)]
pub(crate) struct CallSite {
    pub caller: String,
    pub callee: String,
    /// Effects of the resolved callee signature (builtin or local
    /// function-typed value); empty for user functions, whose effects are
    /// resolved transitively.
    pub effects_hint: Vec<Effect>,
    pub is_user_func: bool,
    pub arg_types: Vec<ir::Type>,
    /// Resolved parameter types, empty when the callee is unknown.
    pub param_types: Vec<ir::Type>,
    pub span: Span,
}

pub(crate) fn run(module: &ir::Module, opts: &Options, diags: &mut Diagnostics) {
    let mut checker = Checker {
        opts,
        diags,
        scopes: ScopeTree::new(),
        aliases: AliasMap::new(),
        funcs: FxHashMap::default(),
        datas: FxHashMap::default(),
        enums: FxHashMap::default(),
        variant_owner: FxHashMap::default(),
        known_types: SCALARS.iter().map(|s| s.to_string()).collect(),
        sites: Vec::new(),
        current_func: String::new(),
        current_ret: ir::Type::Error,
    };
    checker.collect_decls(module);
    checker.check_bodies(module);

    let required = effects::analyze(
        &checker.funcs,
        &checker.sites,
        &opts.effect_config,
        checker.diags,
    );
    checker.check_pii(&required);
    if opts.enforce_capabilities {
        if let Some(manifest) = &opts.capabilities {
            caps::enforce(
                &checker.sites,
                &required,
                &opts.effect_config,
                manifest,
                &module.name,
                checker.diags,
            );
        }
    }
    log::debug!(
        "typechecked module `{}`: {} function(s), {} call site(s)",
        module.name,
        checker.funcs.len(),
        checker.sites.len()
    );
}

struct Checker<'a> {
    opts: &'a Options,
    diags: &'a mut Diagnostics,
    scopes: ScopeTree,
    aliases: AliasMap,
    funcs: FxHashMap<String, FuncSig>,
    datas: FxHashMap<String, DataDef>,
    enums: FxHashMap<String, Vec<String>>,
    variant_owner: FxHashMap<String, String>,
    known_types: FxHashSet<String>,
    sites: Vec<CallSite>,
    current_func: String,
    current_ret: ir::Type,
}

impl Checker<'_> {
    // ── Declaration collection ─────────────────────────────────────────

    fn collect_decls(&mut self, module: &ir::Module) {
        // Type namespace first, so signatures can expand aliases.
        let mut type_names: FxHashSet<String> = FxHashSet::default();
        for decl in &module.decls {
            match decl {
                ir::Decl::Data(data) => {
                    self.declare_type_name(&mut type_names, &data.name, data.span);
                    self.check_field_uniqueness(&data.fields);
                }
                ir::Decl::Enum(decl) => {
                    self.declare_type_name(&mut type_names, &decl.name, decl.span);
                    self.check_enum(decl);
                }
                ir::Decl::TypeAlias(alias) => {
                    self.declare_type_name(&mut type_names, &alias.name, alias.span);
                    self.aliases.insert(
                        alias.name.clone(),
                        alias.target.clone(),
                        alias.span.unwrap_or(Span::DUMMY),
                    );
                }
                ir::Decl::Func(_) | ir::Decl::Import(_) | ir::Decl::Error(_) => {}
            }
        }

        // Now the value namespace, with alias-expanded signatures.
        for decl in &module.decls {
            match decl {
                ir::Decl::Func(func) => {
                    let span = func.span.unwrap_or(Span::DUMMY);
                    if self.funcs.contains_key(&func.name) {
                        self.diags
                            .emit("E102", span, &[("name", func.name.clone())]);
                        continue;
                    }
                    self.check_field_uniqueness(&func.params);
                    let params = func
                        .params
                        .iter()
                        .map(|f| self.aliases.expand(&f.ty, self.diags))
                        .collect();
                    let ret = self.aliases.expand(&func.ret, self.diags);
                    self.funcs.insert(
                        func.name.clone(),
                        FuncSig {
                            type_params: func.type_params.clone(),
                            params,
                            ret,
                            declared_effects: func.declared_effects.clone(),
                            span,
                        },
                    );
                }
                ir::Decl::Data(data) => {
                    let fields = data
                        .fields
                        .iter()
                        .map(|f| (f.name.clone(), self.aliases.expand(&f.ty, self.diags)))
                        .collect();
                    self.datas.insert(
                        data.name.clone(),
                        DataDef {
                            type_params: data.type_params.clone(),
                            fields,
                        },
                    );
                }
                _ => {}
            }
        }
    }

    fn declare_type_name(
        &mut self,
        type_names: &mut FxHashSet<String>,
        name: &str,
        span: Option<Span>,
    ) {
        if !type_names.insert(name.to_string()) {
            self.diags.emit(
                "E102",
                span.unwrap_or(Span::DUMMY),
                &[("name", name.to_string())],
            );
        }
        self.known_types.insert(name.to_string());
    }

    fn check_field_uniqueness(&mut self, fields: &[ir::Field]) {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for field in fields {
            if !seen.insert(field.name.as_str()) {
                self.diags.emit(
                    "E103",
                    field.span.unwrap_or(Span::DUMMY),
                    &[("name", field.name.clone())],
                );
            }
        }
    }

    fn check_enum(&mut self, decl: &ir::EnumDecl) {
        let span = decl.span.unwrap_or(Span::DUMMY);
        if decl.variants.is_empty() {
            self.diags.emit("E104", span, &[("name", decl.name.clone())]);
        }
        let mut names = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for variant in &decl.variants {
            if !seen.insert(variant.name.as_str()) {
                self.diags.emit(
                    "E105",
                    variant.span.unwrap_or(span),
                    &[("name", variant.name.clone())],
                );
                continue;
            }
            names.push(variant.name.clone());
            self.variant_owner
                .entry(variant.name.clone())
                .or_insert_with(|| decl.name.clone());
        }
        self.enums.insert(decl.name.clone(), names);
    }

    // ── Bodies ─────────────────────────────────────────────────────────

    fn check_bodies(&mut self, module: &ir::Module) {
        for decl in &module.decls {
            let ir::Decl::Func(func) = decl else { continue };
            generics::check_func(func, &self.known_types, self.diags);

            let scope = self.scopes.push(self.scopes.root(), ScopeKind::Function);
            for field in &func.params {
                let ty = self.aliases.expand(&field.ty, self.diags);
                let span = field.span.unwrap_or(Span::DUMMY);
                self.define(scope, SymbolInfo::new(&field.name, ty, SymbolKind::Param, span));
            }
            self.current_func = func.name.clone();
            self.current_ret = self.aliases.expand(&func.ret, self.diags);
            self.check_block(&func.body, scope);

            asyncck::check_body(&func.body, self.diags);
        }
    }

    fn define(&mut self, scope: ScopeId, symbol: SymbolInfo) {
        let name = symbol.name.clone();
        let span = symbol.span;
        match self.scopes.define(scope, symbol) {
            Err(_) => self.diags.emit("E102", span, &[("name", name)]),
            Ok(Some(_)) => self.diags.emit("W011", span, &[("name", name)]),
            Ok(None) => {}
        }
    }

    fn check_block(&mut self, block: &ir::Block, parent: ScopeId) {
        let scope = self.scopes.push(parent, ScopeKind::Block);
        for stmt in &block.statements {
            self.check_stmt(stmt, scope);
        }
    }

    fn check_stmt(&mut self, stmt: &ir::Stmt, scope: ScopeId) {
        match stmt {
            ir::Stmt::Let(s) => {
                let ty = self.infer_expr(&s.value, scope);
                if self.opts.debug_types {
                    log::debug!("{}: let {} : {}", self.current_func, s.name, ty);
                }
                let span = s.span.unwrap_or(Span::DUMMY);
                self.define(scope, SymbolInfo::new(&s.name, ty, SymbolKind::Var, span));
            }
            ir::Stmt::Return(s) => {
                let found = match &s.value {
                    Some(value) => self.infer_expr(value, scope),
                    None => ir::Type::name("Nothing"),
                };
                let expected = self.current_ret.clone();
                let span = s
                    .value
                    .as_ref()
                    .and_then(|v| v.span())
                    .or(s.span)
                    .unwrap_or(Span::DUMMY);
                self.unify_rigid(&expected, &found, span);
            }
            ir::Stmt::ExprStmt(s) => {
                self.infer_expr(&s.expr, scope);
            }
            ir::Stmt::Match(s) => {
                let scrutinee = self.infer_expr(&s.scrutinee, scope);
                for arm in &s.arms {
                    let arm_scope = self.scopes.push(scope, ScopeKind::Block);
                    self.bind_pattern(&arm.pattern, &scrutinee, arm_scope, arm.span);
                    for stmt in &arm.body.statements {
                        self.check_stmt(stmt, arm_scope);
                    }
                }
            }
            ir::Stmt::Start(s) => {
                self.infer_expr(&s.call, scope);
            }
            ir::Stmt::Wait(_) => {}
            ir::Stmt::Try(s) => {
                self.check_block(&s.body, scope);
                let handler_scope = self.scopes.push(scope, ScopeKind::Block);
                let span = s.span.unwrap_or(Span::DUMMY);
                self.define(
                    handler_scope,
                    SymbolInfo::new(&s.catch_name, ir::Type::name("Text"), SymbolKind::Var, span),
                );
                for stmt in &s.handler.statements {
                    self.check_stmt(stmt, handler_scope);
                }
            }
            ir::Stmt::Workflow(s) => self.check_block(&s.body, scope),
            ir::Stmt::Error(_) => {}
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn infer_expr(&mut self, expr: &ir::Expr, scope: ScopeId) -> ir::Type {
        match expr {
            ir::Expr::Str { .. } => ir::Type::name("Text"),
            ir::Expr::Int { .. } => ir::Type::name("Int"),
            ir::Expr::Long { .. } => ir::Type::name("Long"),
            ir::Expr::Double { .. } => ir::Type::name("Double"),
            ir::Expr::Bool { .. } => ir::Type::name("Bool"),
            ir::Expr::Null { .. } => ir::Type::name("Nothing"),
            ir::Expr::Name { name, span } => self.infer_name(name, *span, scope),
            ir::Expr::Construct {
                ty, fields, span, ..
            } => self.infer_construct(ty, fields, *span, scope),
            ir::Expr::Call { callee, args, span } => self.infer_call(callee, args, *span, scope),
            ir::Expr::Ok { inner, .. } => ir::Type::Result {
                ok: Box::new(self.infer_expr(inner, scope)),
                err: Box::new(ir::Type::Error),
            },
            ir::Expr::Err { inner, .. } => ir::Type::Result {
                ok: Box::new(ir::Type::Error),
                err: Box::new(self.infer_expr(inner, scope)),
            },
            ir::Expr::Some { inner, .. } => ir::Type::Option {
                item: Box::new(self.infer_expr(inner, scope)),
            },
            ir::Expr::None { .. } => ir::Type::Option {
                item: Box::new(ir::Type::Error),
            },
            ir::Expr::Match {
                scrutinee,
                arms,
                default,
                span,
            } => {
                let scrutinee_ty = self.infer_expr(scrutinee, scope);
                let mut result: Option<ir::Type> = None;
                for arm in arms {
                    let arm_scope = self.scopes.push(scope, ScopeKind::Block);
                    self.bind_pattern(&arm.pattern, &scrutinee_ty, arm_scope, *span);
                    let ty = self.infer_expr(&arm.value, arm_scope);
                    result = Some(self.merge_arm_type(result, ty, arm.value.span().or(*span)));
                }
                if let Some(default) = default {
                    let ty = self.infer_expr(default, scope);
                    result = Some(self.merge_arm_type(result, ty, default.span().or(*span)));
                }
                result.unwrap_or(ir::Type::Error)
            }
            ir::Expr::Lambda { params, body, .. } => {
                let lambda_scope = self.scopes.push(scope, ScopeKind::Lambda);
                for param in params {
                    self.define(
                        lambda_scope,
                        SymbolInfo::new(param, ir::Type::Error, SymbolKind::Param, Span::DUMMY),
                    );
                }
                let ret = self.infer_expr(body, lambda_scope);
                ir::Type::FuncType {
                    params: vec![ir::Type::Error; params.len()],
                    ret: Box::new(ret),
                    declared_effects: Vec::new(),
                }
            }
            ir::Expr::Error { .. } => ir::Type::Error,
        }
    }

    fn merge_arm_type(
        &mut self,
        acc: Option<ir::Type>,
        ty: ir::Type,
        span: Option<Span>,
    ) -> ir::Type {
        match acc {
            None => ty,
            Some(previous) => {
                self.unify_rigid(&previous, &ty, span.unwrap_or(Span::DUMMY));
                previous
            }
        }
    }

    fn infer_name(&mut self, name: &str, span: Option<Span>, scope: ScopeId) -> ir::Type {
        if let Some(symbol) = self.scopes.lookup_and_capture(scope, name) {
            return symbol.ty;
        }
        if let Some(owner) = self.variant_owner.get(name) {
            return ir::Type::name(owner.clone());
        }
        if let Some(sig) = self.funcs.get(name) {
            return ir::Type::FuncType {
                params: sig.params.clone(),
                ret: Box::new(sig.ret.clone()),
                declared_effects: sig.declared_effects.clone(),
            };
        }
        if name.contains('.') {
            // Reference into another module; resolution happens there.
            return ir::Type::Error;
        }
        self.diags.emit(
            "E101",
            span.unwrap_or(Span::DUMMY),
            &[("name", name.to_string())],
        );
        ir::Type::Error
    }

    fn infer_construct(
        &mut self,
        ty_name: &str,
        fields: &[ir::ConstructField],
        span: Option<Span>,
        scope: ScopeId,
    ) -> ir::Type {
        let span = span.unwrap_or(Span::DUMMY);
        let Some(data) = self.datas.get(ty_name).cloned() else {
            // Infer field values anyway so nested errors surface.
            for field in fields {
                self.infer_expr(&field.value, scope);
            }
            self.diags
                .emit("E101", span, &[("name", ty_name.to_string())]);
            return ir::Type::Error;
        };
        let bindable: FxHashSet<String> = data.type_params.iter().cloned().collect();
        let mut subst = Subst::new();
        for field in fields {
            let value_ty = self.infer_expr(&field.value, scope);
            match data.fields.iter().find(|(name, _)| name == &field.name) {
                Some((_, decl_ty)) => {
                    let at = field.value.span().unwrap_or(span);
                    if let Err(err) = unify::unify(decl_ty, &value_ty, &mut subst, &bindable) {
                        self.report_unify(err, at, ty_name);
                    }
                }
                None => {
                    self.diags.emit(
                        "E101",
                        span,
                        &[("name", format!("{ty_name}.{}", field.name))],
                    );
                }
            }
        }
        if data.type_params.is_empty() {
            ir::Type::name(ty_name)
        } else {
            ir::Type::TypeApp {
                base: ty_name.to_string(),
                args: data
                    .type_params
                    .iter()
                    .map(|p| subst.get(p).cloned().unwrap_or(ir::Type::Error))
                    .collect(),
            }
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn infer_call(
        &mut self,
        callee: &str,
        args: &[ir::Expr],
        span: Option<Span>,
        scope: ScopeId,
    ) -> ir::Type {
        let span = span.unwrap_or(Span::DUMMY);
        let arg_types: Vec<ir::Type> =
            args.iter().map(|arg| self.infer_expr(arg, scope)).collect();

        if let Some(ty) = self.check_operator(callee, &arg_types, args, span) {
            return ty;
        }

        // Local function-typed values shadow module rules.
        if let Some(symbol) = self.scopes.lookup_and_capture(scope, callee) {
            return match symbol.ty {
                ir::Type::FuncType {
                    params,
                    ret,
                    declared_effects,
                } => {
                    let (ret, param_types) =
                        self.conform_call(callee, &[], &params, &ret, &arg_types, args, span);
                    self.record_site(
                        callee,
                        declared_effects,
                        false,
                        arg_types,
                        param_types,
                        span,
                    );
                    ret
                }
                ir::Type::Error => ir::Type::Error,
                _ => {
                    self.diags
                        .emit("E206", span, &[("name", callee.to_string())]);
                    ir::Type::Error
                }
            };
        }

        if let Some(sig) = self.funcs.get(callee).cloned() {
            let (ret, param_types) = self.conform_call(
                callee,
                &sig.type_params,
                &sig.params,
                &sig.ret,
                &arg_types,
                args,
                span,
            );
            self.record_site(callee, Vec::new(), true, arg_types, param_types, span);
            return ret;
        }

        if let Some(builtin) = builtins::signature(callee) {
            let (ret, param_types) = self.conform_call(
                callee,
                &builtin.type_params,
                &builtin.params,
                &builtin.ret,
                &arg_types,
                args,
                span,
            );
            self.record_site(callee, builtin.effects, false, arg_types, param_types, span);
            return ret;
        }

        if callee.contains('.') {
            // External call; the effect-prefix table still classifies it.
            self.record_site(callee, Vec::new(), false, arg_types, Vec::new(), span);
            return ir::Type::Error;
        }

        self.diags
            .emit("E101", span, &[("name", callee.to_string())]);
        ir::Type::Error
    }

    #[allow(clippy::too_many_arguments)]
    fn conform_call(
        &mut self,
        name: &str,
        type_params: &[String],
        params: &[ir::Type],
        ret: &ir::Type,
        arg_types: &[ir::Type],
        args: &[ir::Expr],
        span: Span,
    ) -> (ir::Type, Vec<ir::Type>) {
        if arg_types.len() != params.len() {
            self.diags.emit(
                "E205",
                span,
                &[
                    ("name", name.to_string()),
                    ("expected", params.len().to_string()),
                    ("actual", arg_types.len().to_string()),
                ],
            );
            return (ir::Type::Error, Vec::new());
        }
        let bindable: FxHashSet<String> = type_params.iter().cloned().collect();
        let mut subst = Subst::new();
        for ((param, arg_ty), arg) in params.iter().zip(arg_types).zip(args) {
            if let Err(err) = unify::unify(param, arg_ty, &mut subst, &bindable) {
                let at = arg.span().unwrap_or(span);
                self.report_unify(err, at, name);
            }
        }
        let ret = unify::apply(ret, &subst);
        let resolved = params.iter().map(|p| unify::apply(p, &subst)).collect();
        (ret, resolved)
    }

    fn record_site(
        &mut self,
        callee: &str,
        effects_hint: Vec<Effect>,
        is_user_func: bool,
        arg_types: Vec<ir::Type>,
        param_types: Vec<ir::Type>,
        span: Span,
    ) {
        self.sites.push(CallSite {
            caller: self.current_func.clone(),
            callee: callee.to_string(),
            effects_hint,
            is_user_func,
            arg_types,
            param_types,
            span,
        });
    }

    // ── Operators ──────────────────────────────────────────────────────

    fn check_operator(
        &mut self,
        op: &str,
        arg_types: &[ir::Type],
        args: &[ir::Expr],
        span: Span,
    ) -> Option<ir::Type> {
        match op {
            "+" | "-" | "*" | "/" => Some(self.check_arith(op, arg_types, args, span)),
            "==" | "!=" | "<" | ">" => {
                if let [lhs, rhs] = arg_types {
                    let at = args
                        .first()
                        .and_then(|a| a.span())
                        .unwrap_or(span);
                    self.unify_rigid(lhs, rhs, at);
                }
                Some(ir::Type::name("Bool"))
            }
            "and" | "or" => {
                for (ty, arg) in arg_types.iter().zip(args) {
                    self.expect_bool(ty, arg, span);
                }
                Some(ir::Type::name("Bool"))
            }
            "not" => {
                for (ty, arg) in arg_types.iter().zip(args) {
                    self.expect_bool(ty, arg, span);
                }
                Some(ir::Type::name("Bool"))
            }
            _ => None,
        }
    }

    /// Numeric operator typing doubles as literal partial evaluation: the
    /// result type is the widest operand type (`Int` < `Long` < `Double`),
    /// with `plus` also accepting Text concatenation.
    fn check_arith(
        &mut self,
        op: &str,
        arg_types: &[ir::Type],
        args: &[ir::Expr],
        span: Span,
    ) -> ir::Type {
        if op == "+"
            && arg_types
                .iter()
                .all(|t| matches!(t, ir::Type::TypeName { name } if name == "Text"))
        {
            return ir::Type::name("Text");
        }
        let mut rank = 0u8;
        let mut any_error = false;
        for (ty, arg) in arg_types.iter().zip(args) {
            match numeric_rank(ty) {
                Some(r) => rank = rank.max(r),
                None if matches!(ty, ir::Type::Error) => any_error = true,
                None => {
                    let at = arg.span().unwrap_or(span);
                    self.diags.emit(
                        "E201",
                        at,
                        &[
                            ("expected", "Int".to_string()),
                            ("actual", ty.to_string()),
                        ],
                    );
                    any_error = true;
                }
            }
        }
        if any_error {
            return ir::Type::Error;
        }
        match rank {
            2 => ir::Type::name("Double"),
            1 => ir::Type::name("Long"),
            _ => ir::Type::name("Int"),
        }
    }

    fn expect_bool(&mut self, ty: &ir::Type, arg: &ir::Expr, span: Span) {
        let ok = matches!(ty, ir::Type::TypeName { name } if name == "Bool")
            || matches!(ty, ir::Type::Error);
        if !ok {
            let at = arg.span().unwrap_or(span);
            self.diags.emit(
                "E201",
                at,
                &[("expected", "Bool".to_string()), ("actual", ty.to_string())],
            );
        }
    }

    // ── Patterns ───────────────────────────────────────────────────────

    fn bind_pattern(
        &mut self,
        pattern: &ir::Pattern,
        scrutinee: &ir::Type,
        scope: ScopeId,
        span: Option<Span>,
    ) {
        let span = span.unwrap_or(Span::DUMMY);
        match pattern {
            ir::Pattern::Int { .. } => self.unify_rigid(scrutinee, &ir::Type::name("Int"), span),
            ir::Pattern::Str { .. } => self.unify_rigid(scrutinee, &ir::Type::name("Text"), span),
            ir::Pattern::Bool { .. } => self.unify_rigid(scrutinee, &ir::Type::name("Bool"), span),
            ir::Pattern::Bind { name } => {
                self.define(
                    scope,
                    SymbolInfo::new(name, scrutinee.clone(), SymbolKind::Var, span),
                );
            }
            ir::Pattern::Variant { name, bind } => {
                let inner = self.variant_payload(name, scrutinee, span);
                if let Some(bind) = bind {
                    self.define(scope, SymbolInfo::new(bind, inner, SymbolKind::Var, span));
                }
            }
            ir::Pattern::Wildcard => {}
        }
    }

    /// The type a variant pattern binds: the payload side of an
    /// Option/Result scrutinee, or nothing for enum variants.
    fn variant_payload(&mut self, name: &str, scrutinee: &ir::Type, span: Span) -> ir::Type {
        match name {
            "Some" => match scrutinee {
                ir::Type::Option { item } | ir::Type::Maybe { item } => (**item).clone(),
                ir::Type::Error => ir::Type::Error,
                other => {
                    self.pattern_mismatch("Option", other, span);
                    ir::Type::Error
                }
            },
            "None" => {
                if !matches!(
                    scrutinee,
                    ir::Type::Option { .. } | ir::Type::Maybe { .. } | ir::Type::Error
                ) {
                    self.pattern_mismatch("Option", scrutinee, span);
                }
                ir::Type::Error
            }
            "Ok" => match scrutinee {
                ir::Type::Result { ok, .. } => (**ok).clone(),
                ir::Type::Error => ir::Type::Error,
                other => {
                    self.pattern_mismatch("Result", other, span);
                    ir::Type::Error
                }
            },
            "Err" => match scrutinee {
                ir::Type::Result { err, .. } => (**err).clone(),
                ir::Type::Error => ir::Type::Error,
                other => {
                    self.pattern_mismatch("Result", other, span);
                    ir::Type::Error
                }
            },
            variant => {
                match self.variant_owner.get(variant).cloned() {
                    Some(owner) => {
                        self.unify_rigid(scrutinee, &ir::Type::name(owner), span);
                    }
                    None => {
                        self.diags
                            .emit("E101", span, &[("name", variant.to_string())]);
                    }
                }
                ir::Type::Error
            }
        }
    }

    fn pattern_mismatch(&mut self, expected: &str, actual: &ir::Type, span: Span) {
        self.diags.emit(
            "E201",
            span,
            &[
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
        );
    }

    // ── PII flow ───────────────────────────────────────────────────────

    /// A PII-typed value may only flow into an I/O-performing call through
    /// `Pii.reveal`; everywhere else the wrapper must be intact on the
    /// receiving side too.
    fn check_pii(&mut self, required: &FxHashMap<String, BTreeSet<Effect>>) {
        for site in &self.sites {
            if site.callee == builtins::PII_REVEAL {
                continue;
            }
            let effect_set = effects::site_effects(site, required, &self.opts.effect_config);
            if !effect_set.iter().any(Effect::is_io_like) {
                continue;
            }
            for (index, arg_ty) in site.arg_types.iter().enumerate() {
                if !is_pii(arg_ty) {
                    continue;
                }
                let param_is_pii = site
                    .param_types
                    .get(index)
                    .is_some_and(is_pii);
                if !param_is_pii {
                    self.diags.emit(
                        "E401",
                        site.span,
                        &[("name", site.callee.clone())],
                    );
                }
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn unify_rigid(&mut self, expected: &ir::Type, found: &ir::Type, span: Span) {
        let mut subst = Subst::new();
        let empty = FxHashSet::default();
        if let Err(err) = unify::unify(expected, found, &mut subst, &empty) {
            self.report_unify(err, span, "");
        }
    }

    fn report_unify(&mut self, err: UnifyError, span: Span, context_name: &str) {
        match err {
            UnifyError::Mismatch { expected, found } => {
                self.diags.emit(
                    "E201",
                    span,
                    &[
                        ("expected", expected.to_string()),
                        ("actual", found.to_string()),
                    ],
                );
            }
            UnifyError::Inconsistent {
                name,
                previous,
                actual,
            } => {
                self.diags.emit(
                    "E202",
                    span,
                    &[
                        ("name", name),
                        ("previous", previous.to_string()),
                        ("actual", actual.to_string()),
                    ],
                );
            }
            UnifyError::Arity { expected, found } => {
                self.diags.emit(
                    "E205",
                    span,
                    &[
                        ("name", context_name.to_string()),
                        ("expected", expected.to_string()),
                        ("actual", found.to_string()),
                    ],
                );
            }
            UnifyError::Occurs { name, ty } => {
                self.diags.emit(
                    "E208",
                    span,
                    &[("name", name), ("ty", ty.to_string())],
                );
            }
        }
    }
}

fn numeric_rank(ty: &ir::Type) -> Option<u8> {
    match ty {
        ir::Type::TypeName { name } => match name.as_str() {
            "Int" => Some(0),
            "Long" => Some(1),
            "Double" => Some(2),
            _ => None,
        },
        _ => None,
    }
}

fn is_pii(ty: &ir::Type) -> bool {
    matches!(ty, ir::Type::Pii { .. })
}
