//! Core IR node definitions and the JSON wire format.
//!
//! The IR is the AST minus surface sugar: no `If` (flattened to
//! match-on-bool), no word operators (canonical call nodes), no inferred
//! type markers (types are stamped). Every node is serde-serializable;
//! spans are optional and stripped for golden-file equality.

use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use aster_common::span::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of the JSON envelope. Bumped on breaking IR changes.
pub const IR_VERSION: u32 = 1;

// ── Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    TypeName {
        name: String,
    },
    TypeVar {
        name: String,
    },
    TypeApp {
        base: String,
        args: Vec<Type>,
    },
    FuncType {
        params: Vec<Type>,
        ret: Box<Type>,
        #[serde(rename = "declaredEffects")]
        declared_effects: Vec<Effect>,
    },
    List {
        item: Box<Type>,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Option {
        item: Box<Type>,
    },
    Maybe {
        item: Box<Type>,
    },
    Result {
        ok: Box<Type>,
        err: Box<Type>,
    },
    Pii {
        item: Box<Type>,
    },
    /// Placeholder for a type that failed to parse.
    Error,
}

impl Type {
    pub fn name(name: impl Into<String>) -> Type {
        Type::TypeName { name: name.into() }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::TypeName { name } | Type::TypeVar { name } => f.write_str(name),
            Type::TypeApp { base, args } => {
                write!(f, "{base} of ")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "{arg}")?;
                }
                Ok(())
            }
            Type::FuncType { params, ret, .. } => {
                write!(f, "rule given ")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, " produce {ret}")
            }
            Type::List { item } => write!(f, "List of {item}"),
            Type::Map { key, value } => write!(f, "Map of {key} to {value}"),
            Type::Option { item } => write!(f, "Option of {item}"),
            Type::Maybe { item } => write!(f, "Maybe of {item}"),
            Type::Result { ok, err } => write!(f, "Result of {ok} or {err}"),
            Type::Pii { item } => write!(f, "Pii of {item}"),
            Type::Error => f.write_str("?"),
        }
    }
}

// ── Constraints ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Constraint {
    Required,
    Range {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        min: Option<Number>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        max: Option<Number>,
    },
    Pattern {
        regexp: String,
    },
}

// ── Declarations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Decl {
    Func(Func),
    Data(Data),
    Enum(EnumDecl),
    TypeAlias(TypeAlias),
    Import(Import),
    Error(ErrorDecl),
}

impl Decl {
    /// The unique identifier stamped by lowering.
    pub fn id(&self) -> u32 {
        match self {
            Decl::Func(d) => d.id,
            Decl::Data(d) => d.id,
            Decl::Enum(d) => d.id,
            Decl::TypeAlias(d) => d.id,
            Decl::Import(d) => d.id,
            Decl::Error(d) => d.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Func {
    pub id: u32,
    pub name: String,
    pub type_params: Vec<String>,
    pub effect_params: Vec<String>,
    pub params: Vec<Field>,
    pub ret: Type,
    pub declared_effects: Vec<Effect>,
    pub body: Block,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub id: u32,
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDecl {
    pub id: u32,
    pub name: String,
    pub type_params: Vec<String>,
    pub variants: Vec<Variant>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAlias {
    pub id: u32,
    pub name: String,
    pub target: Type,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub id: u32,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDecl {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

// ── Statements ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub struct Block {
    pub statements: Vec<Stmt>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Let(LetStmt),
    Return(ReturnStmt),
    ExprStmt(ExprStmt),
    Match(MatchStmt),
    Start(StartStmt),
    Wait(WaitStmt),
    Try(TryStmt),
    Workflow(WorkflowStmt),
    Error(ErrorStmt),
}

impl Stmt {
    pub fn span(&self) -> Option<Span> {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::ExprStmt(s) => s.span,
            Stmt::Match(s) => s.span,
            Stmt::Start(s) => s.span,
            Stmt::Wait(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Workflow(s) => s.span,
            Stmt::Error(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetStmt {
    pub name: String,
    pub value: Expr,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStmt {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprStmt {
    pub expr: Expr,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Block,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStmt {
    pub task: String,
    pub call: Expr,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitStmt {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryStmt {
    pub body: Block,
    pub catch_name: String,
    pub handler: Block,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStmt {
    pub body: Block,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStmt {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
}

// ── Patterns ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Pattern {
    Int {
        value: i64,
    },
    Str {
        value: String,
    },
    Bool {
        value: bool,
    },
    Bind {
        name: String,
    },
    Variant {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        bind: Option<String>,
    },
    Wildcard,
}

// ── Expressions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Str {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Int {
        value: i64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Long {
        value: i64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Double {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Bool {
        value: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Null {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Name {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Construct {
        #[serde(rename = "type")]
        ty: String,
        fields: Vec<ConstructField>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Ok {
        inner: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Err {
        inner: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Some {
        inner: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    None {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<ExprArm>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        default: Option<Box<Expr>>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        span: Option<Span>,
    },
}

impl Expr {
    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Str { span, .. }
            | Expr::Int { span, .. }
            | Expr::Long { span, .. }
            | Expr::Double { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Null { span }
            | Expr::Name { span, .. }
            | Expr::Construct { span, .. }
            | Expr::Call { span, .. }
            | Expr::Ok { span, .. }
            | Expr::Err { span, .. }
            | Expr::Some { span, .. }
            | Expr::None { span }
            | Expr::Match { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Error { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructField {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprArm {
    pub pattern: Pattern,
    pub value: Expr,
}

// ── Wire format ────────────────────────────────────────────────────────

/// JSON envelope around a serialized module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub module: Module,
}

/// Errors on malformed Core IR input. These are programmer errors from
/// upstream tooling, not user diagnostics, and abort the pass.
#[derive(Debug, Error)]
pub enum IrError {
    #[error("malformed Core IR JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Core IR envelope is missing the `{0}` field")]
    MissingField(&'static str),
}

/// Serialize a module into the versioned JSON envelope.
pub fn to_json(module: &Module) -> String {
    let envelope = Envelope {
        version: IR_VERSION,
        module: module.clone(),
    };
    serde_json::to_string_pretty(&envelope).expect("Core IR serialization cannot fail")
}

/// Deserialize a module from the JSON envelope.
///
/// A version mismatch is a user-facing diagnostic (`E008`) and yields
/// `Ok(None)`; malformed JSON is an [`IrError`].
pub fn from_json(
    json: &str,
    diags: &mut Diagnostics,
) -> Result<Option<Module>, IrError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let version = value
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or(IrError::MissingField("version"))?;
    if version != IR_VERSION as u64 {
        diags.emit(
            "E008",
            Span::DUMMY,
            &[
                ("found", version.to_string()),
                ("expected", IR_VERSION.to_string()),
            ],
        );
        return Ok(None);
    }
    let module_value = value
        .get("module")
        .cloned()
        .ok_or(IrError::MissingField("module"))?;
    let module: Module = serde_json::from_value(module_value)?;
    Ok(Some(module))
}
