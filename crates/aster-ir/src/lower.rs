//! Lowering: AST to Core IR.
//!
//! A purely syntactic rewrite. No types are read from any environment;
//! spans pass through unchanged. The work is:
//!
//! - stamp a unique id on every declaration,
//! - resolve inferred field types (name mapping refined by constraints)
//!   and drop the inferred marker,
//! - desugar word operators to canonical call nodes,
//! - flatten `If`/`Otherwise` into match-on-bool,
//! - map `ok of` / `err of` / `some of` / `none` onto tagged IR nodes.

use aster_parser::ast;
use aster_parser::infer;

use crate::ir;

/// Lower a parsed module into Core IR.
pub fn lower_module(module: ast::Module) -> ir::Module {
    let mut lowerer = Lowerer { next_id: 0 };
    let decls = module
        .decls
        .into_iter()
        .map(|decl| lowerer.lower_decl(decl))
        .collect();
    log::debug!("lowered module `{}`", module.name.dotted());
    ir::Module {
        name: module.name.dotted(),
        decls,
    }
}

struct Lowerer {
    next_id: u32,
}

impl Lowerer {
    fn fresh_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn lower_decl(&mut self, decl: ast::Decl) -> ir::Decl {
        let id = self.fresh_id();
        match decl {
            ast::Decl::Func(func) => ir::Decl::Func(ir::Func {
                id,
                name: func.name,
                type_params: func.type_params,
                effect_params: func.effect_params,
                params: func.params.into_iter().map(lower_field).collect(),
                ret: lower_type(func.ret),
                declared_effects: func.declared_effects,
                body: lower_block(func.body),
                span: Some(func.span),
            }),
            ast::Decl::Data(data) => ir::Decl::Data(ir::Data {
                id,
                name: data.name,
                type_params: data.type_params,
                fields: data.fields.into_iter().map(lower_field).collect(),
                span: Some(data.span),
            }),
            ast::Decl::Enum(decl) => ir::Decl::Enum(ir::EnumDecl {
                id,
                name: decl.name,
                type_params: decl.type_params,
                variants: decl
                    .variants
                    .into_iter()
                    .map(|(name, span)| ir::Variant {
                        name,
                        span: Some(span),
                    })
                    .collect(),
                span: Some(decl.span),
            }),
            ast::Decl::TypeAlias(alias) => ir::Decl::TypeAlias(ir::TypeAlias {
                id,
                name: alias.name,
                target: lower_type(alias.target),
                span: Some(alias.span),
            }),
            ast::Decl::Import(import) => ir::Decl::Import(ir::Import {
                id,
                path: import.path.dotted(),
                span: Some(import.span),
            }),
            ast::Decl::Error(span) => ir::Decl::Error(ir::ErrorDecl {
                id,
                span: Some(span),
            }),
        }
    }
}

/// Resolve the field type (refining inferred types by constraints), drop
/// the inferred marker, and lower the constraint payloads.
fn lower_field(field: ast::Field) -> ir::Field {
    let ty = if field.type_inferred {
        infer::refine_with_constraints(field.ty, &field.constraints)
    } else {
        field.ty
    };
    ir::Field {
        name: field.name,
        ty: lower_type(ty),
        constraints: field.constraints.into_iter().map(lower_constraint).collect(),
        span: Some(field.span),
    }
}

fn lower_constraint(constraint: ast::Constraint) -> ir::Constraint {
    match constraint {
        ast::Constraint::Required => ir::Constraint::Required,
        ast::Constraint::Range { min, max } => ir::Constraint::Range {
            min: min.map(lower_number),
            max: max.map(lower_number),
        },
        ast::Constraint::Pattern { regexp } => ir::Constraint::Pattern { regexp },
    }
}

fn lower_number(number: ast::Number) -> ir::Number {
    match number {
        ast::Number::Int(value) => ir::Number::Int(value),
        ast::Number::Float(value) => ir::Number::Float(value),
    }
}

fn lower_type(ty: ast::TypeExpr) -> ir::Type {
    match ty {
        ast::TypeExpr::Name { name, .. } => ir::Type::TypeName { name },
        ast::TypeExpr::Var { name, .. } => ir::Type::TypeVar { name },
        ast::TypeExpr::App { base, args, .. } => ir::Type::TypeApp {
            base,
            args: args.into_iter().map(lower_type).collect(),
        },
        ast::TypeExpr::Func {
            params,
            ret,
            effects,
            ..
        } => ir::Type::FuncType {
            params: params.into_iter().map(lower_type).collect(),
            ret: Box::new(lower_type(*ret)),
            declared_effects: effects,
        },
        ast::TypeExpr::List { item, .. } => ir::Type::List {
            item: Box::new(lower_type(*item)),
        },
        ast::TypeExpr::Map { key, value, .. } => ir::Type::Map {
            key: Box::new(lower_type(*key)),
            value: Box::new(lower_type(*value)),
        },
        ast::TypeExpr::Option { item, .. } => ir::Type::Option {
            item: Box::new(lower_type(*item)),
        },
        ast::TypeExpr::Maybe { item, .. } => ir::Type::Maybe {
            item: Box::new(lower_type(*item)),
        },
        ast::TypeExpr::Result { ok, err, .. } => ir::Type::Result {
            ok: Box::new(lower_type(*ok)),
            err: Box::new(lower_type(*err)),
        },
        ast::TypeExpr::Pii { item, .. } => ir::Type::Pii {
            item: Box::new(lower_type(*item)),
        },
        ast::TypeExpr::Error { .. } => ir::Type::Error,
    }
}

fn lower_block(block: ast::Block) -> ir::Block {
    ir::Block {
        statements: block.stmts.into_iter().map(lower_stmt).collect(),
        span: Some(block.span),
    }
}

fn lower_stmt(stmt: ast::Stmt) -> ir::Stmt {
    match stmt {
        ast::Stmt::Let { name, value, span } => ir::Stmt::Let(ir::LetStmt {
            name,
            value: lower_expr(value),
            span: Some(span),
        }),
        ast::Stmt::Return { value, span } => ir::Stmt::Return(ir::ReturnStmt {
            value: value.map(lower_expr),
            span: Some(span),
        }),
        ast::Stmt::Expr { expr, span } => ir::Stmt::ExprStmt(ir::ExprStmt {
            expr: lower_expr(expr),
            span: Some(span),
        }),
        // If/Otherwise flattens into the canonical match-on-bool form. A
        // missing Otherwise becomes an explicit empty false arm so control
        // flow stays visible to the async analysis.
        ast::Stmt::If {
            cond,
            then_block,
            else_block,
            span,
        } => {
            let cond_span = cond.span();
            let else_block = else_block.unwrap_or(ast::Block {
                stmts: Vec::new(),
                span,
            });
            ir::Stmt::Match(ir::MatchStmt {
                scrutinee: lower_expr(cond),
                arms: vec![
                    ir::MatchArm {
                        pattern: ir::Pattern::Bool { value: true },
                        span: Some(then_block.span),
                        body: lower_block(then_block),
                    },
                    ir::MatchArm {
                        pattern: ir::Pattern::Bool { value: false },
                        span: Some(else_block.span),
                        body: lower_block(else_block),
                    },
                ],
                span: Some(span.merge(cond_span)),
            })
        }
        ast::Stmt::Match {
            scrutinee,
            arms,
            span,
        } => ir::Stmt::Match(ir::MatchStmt {
            scrutinee: lower_expr(scrutinee),
            arms: arms.into_iter().map(lower_arm).collect(),
            span: Some(span),
        }),
        ast::Stmt::Start { task, call, span } => ir::Stmt::Start(ir::StartStmt {
            task,
            call: lower_expr(call),
            span: Some(span),
        }),
        ast::Stmt::Wait { task, span } => ir::Stmt::Wait(ir::WaitStmt {
            task,
            span: Some(span),
        }),
        ast::Stmt::Try {
            body,
            catch_name,
            handler,
            span,
        } => ir::Stmt::Try(ir::TryStmt {
            body: lower_block(body),
            catch_name,
            handler: lower_block(handler),
            span: Some(span),
        }),
        ast::Stmt::Workflow { body, span } => ir::Stmt::Workflow(ir::WorkflowStmt {
            body: lower_block(body),
            span: Some(span),
        }),
        ast::Stmt::Error { span } => ir::Stmt::Error(ir::ErrorStmt { span: Some(span) }),
    }
}

fn lower_arm(arm: ast::MatchArm) -> ir::MatchArm {
    ir::MatchArm {
        pattern: lower_pattern(arm.pattern),
        body: lower_block(arm.body),
        span: Some(arm.span),
    }
}

fn lower_pattern(pattern: ast::Pattern) -> ir::Pattern {
    match pattern {
        ast::Pattern::Int { value, .. } => ir::Pattern::Int { value },
        ast::Pattern::Str { value, .. } => ir::Pattern::Str { value },
        ast::Pattern::Bool { value, .. } => ir::Pattern::Bool { value },
        ast::Pattern::Bind { name, .. } => ir::Pattern::Bind { name },
        ast::Pattern::Variant { name, bind, .. } => ir::Pattern::Variant { name, bind },
        ast::Pattern::Wildcard { .. } => ir::Pattern::Wildcard,
    }
}

fn lower_expr(expr: ast::Expr) -> ir::Expr {
    match expr {
        ast::Expr::Str { value, span } => ir::Expr::Str {
            value,
            span: Some(span),
        },
        ast::Expr::Int { value, span } => ir::Expr::Int {
            value,
            span: Some(span),
        },
        ast::Expr::Long { value, span } => ir::Expr::Long {
            value,
            span: Some(span),
        },
        ast::Expr::Double { value, span } => ir::Expr::Double {
            value,
            span: Some(span),
        },
        ast::Expr::Bool { value, span } => ir::Expr::Bool {
            value,
            span: Some(span),
        },
        ast::Expr::Null { span } => ir::Expr::Null { span: Some(span) },
        ast::Expr::Name { name, span } => ir::Expr::Name {
            name,
            span: Some(span),
        },
        ast::Expr::Construct { ty, fields, span } => ir::Expr::Construct {
            ty,
            fields: fields
                .into_iter()
                .map(|(name, value)| ir::ConstructField {
                    name,
                    value: lower_expr(value),
                })
                .collect(),
            span: Some(span),
        },
        ast::Expr::Call { callee, args, span } => ir::Expr::Call {
            callee: callee.dotted(),
            args: args.into_iter().map(lower_expr).collect(),
            span: Some(span),
        },
        ast::Expr::Ok { inner, span } => ir::Expr::Ok {
            inner: Box::new(lower_expr(*inner)),
            span: Some(span),
        },
        ast::Expr::Err { inner, span } => ir::Expr::Err {
            inner: Box::new(lower_expr(*inner)),
            span: Some(span),
        },
        ast::Expr::Some { inner, span } => ir::Expr::Some {
            inner: Box::new(lower_expr(*inner)),
            span: Some(span),
        },
        ast::Expr::None { span } => ir::Expr::None { span: Some(span) },
        ast::Expr::Match {
            scrutinee,
            arms,
            default,
            span,
        } => ir::Expr::Match {
            scrutinee: Box::new(lower_expr(*scrutinee)),
            arms: arms
                .into_iter()
                .map(|(pattern, value)| ir::ExprArm {
                    pattern: lower_pattern(pattern),
                    value: lower_expr(value),
                })
                .collect(),
            default: default.map(|e| Box::new(lower_expr(*e))),
            span: Some(span),
        },
        ast::Expr::Lambda { params, body, span } => ir::Expr::Lambda {
            params: params.into_iter().map(|(name, _)| name).collect(),
            body: Box::new(lower_expr(*body)),
            span: Some(span),
        },
        // Conditional expressions flatten to match-on-bool, same as the
        // statement form.
        ast::Expr::If {
            cond,
            then_value,
            else_value,
            span,
        } => ir::Expr::Match {
            scrutinee: Box::new(lower_expr(*cond)),
            arms: vec![
                ir::ExprArm {
                    pattern: ir::Pattern::Bool { value: true },
                    value: lower_expr(*then_value),
                },
                ir::ExprArm {
                    pattern: ir::Pattern::Bool { value: false },
                    value: lower_expr(*else_value),
                },
            ],
            default: None,
            span: Some(span),
        },
        // Word operators become canonical call nodes: `a plus b` is a call
        // of `+`, `not a` a call of `not`.
        ast::Expr::Binary { op, lhs, rhs, span } => ir::Expr::Call {
            callee: op.symbol().to_string(),
            args: vec![lower_expr(*lhs), lower_expr(*rhs)],
            span: Some(span),
        },
        ast::Expr::Not { inner, span } => ir::Expr::Call {
            callee: "not".to_string(),
            args: vec![lower_expr(*inner)],
            span: Some(span),
        },
        ast::Expr::Error { span } => ir::Expr::Error { span: Some(span) },
    }
}
