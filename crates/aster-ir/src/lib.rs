//! Aster Core IR: the typed, desugared, serializable representation
//! consumed by the typechecker and back-ends.
//!
//! [`ir`] defines the nodes and the versioned JSON envelope; [`lower`]
//! turns the parser's AST into IR. [`strip_spans`] erases all span fields
//! for golden-file and determinism comparisons.

pub mod ir;
pub mod lower;

pub use ir::{from_json, to_json, IrError, IR_VERSION};
pub use lower::lower_module;

/// Remove every span from a module, in place. Span-stripped modules are
/// the unit of golden-file equality.
pub fn strip_spans(module: &mut ir::Module) {
    for decl in &mut module.decls {
        strip_decl(decl);
    }
}

fn strip_decl(decl: &mut ir::Decl) {
    match decl {
        ir::Decl::Func(func) => {
            func.span = None;
            for field in &mut func.params {
                field.span = None;
            }
            strip_block(&mut func.body);
        }
        ir::Decl::Data(data) => {
            data.span = None;
            for field in &mut data.fields {
                field.span = None;
            }
        }
        ir::Decl::Enum(decl) => {
            decl.span = None;
            for variant in &mut decl.variants {
                variant.span = None;
            }
        }
        ir::Decl::TypeAlias(alias) => alias.span = None,
        ir::Decl::Import(import) => import.span = None,
        ir::Decl::Error(err) => err.span = None,
    }
}

fn strip_block(block: &mut ir::Block) {
    block.span = None;
    for stmt in &mut block.statements {
        strip_stmt(stmt);
    }
}

fn strip_stmt(stmt: &mut ir::Stmt) {
    match stmt {
        ir::Stmt::Let(s) => {
            s.span = None;
            strip_expr(&mut s.value);
        }
        ir::Stmt::Return(s) => {
            s.span = None;
            if let Some(value) = &mut s.value {
                strip_expr(value);
            }
        }
        ir::Stmt::ExprStmt(s) => {
            s.span = None;
            strip_expr(&mut s.expr);
        }
        ir::Stmt::Match(s) => {
            s.span = None;
            strip_expr(&mut s.scrutinee);
            for arm in &mut s.arms {
                arm.span = None;
                strip_block(&mut arm.body);
            }
        }
        ir::Stmt::Start(s) => {
            s.span = None;
            strip_expr(&mut s.call);
        }
        ir::Stmt::Wait(s) => s.span = None,
        ir::Stmt::Try(s) => {
            s.span = None;
            strip_block(&mut s.body);
            strip_block(&mut s.handler);
        }
        ir::Stmt::Workflow(s) => {
            s.span = None;
            strip_block(&mut s.body);
        }
        ir::Stmt::Error(s) => s.span = None,
    }
}

fn strip_expr(expr: &mut ir::Expr) {
    match expr {
        ir::Expr::Str { span, .. }
        | ir::Expr::Int { span, .. }
        | ir::Expr::Long { span, .. }
        | ir::Expr::Double { span, .. }
        | ir::Expr::Bool { span, .. }
        | ir::Expr::Null { span }
        | ir::Expr::Name { span, .. }
        | ir::Expr::None { span }
        | ir::Expr::Error { span } => *span = None,
        ir::Expr::Construct { fields, span, .. } => {
            *span = None;
            for field in fields {
                strip_expr(&mut field.value);
            }
        }
        ir::Expr::Call { args, span, .. } => {
            *span = None;
            for arg in args {
                strip_expr(arg);
            }
        }
        ir::Expr::Ok { inner, span }
        | ir::Expr::Err { inner, span }
        | ir::Expr::Some { inner, span } => {
            *span = None;
            strip_expr(inner);
        }
        ir::Expr::Match {
            scrutinee,
            arms,
            default,
            span,
        } => {
            *span = None;
            strip_expr(scrutinee);
            for arm in arms {
                strip_expr(&mut arm.value);
            }
            if let Some(default) = default {
                strip_expr(default);
            }
        }
        ir::Expr::Lambda { body, span, .. } => {
            *span = None;
            strip_expr(body);
        }
    }
}
