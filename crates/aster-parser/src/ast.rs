//! The Aster abstract syntax tree.
//!
//! Plain tagged sums with owned spans. The AST mirrors the surface
//! grammar, sugar included; lowering to Core IR removes the sugar. Nodes
//! whose parse failed are represented by `Error` variants so later phases
//! can skip them without cascading.

use aster_common::effect::Effect;
use aster_common::span::Span;

/// A dot-separated qualified name (`demo.utils`, `Io.print`).
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub parts: Vec<String>,
    pub span: Span,
}

impl QualifiedName {
    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }

    pub fn is_qualified(&self) -> bool {
        self.parts.len() > 1
    }
}

/// One source module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: QualifiedName,
    pub decls: Vec<Decl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(Func),
    Data(Data),
    Enum(EnumDecl),
    TypeAlias(TypeAlias),
    Import(Import),
    /// A declaration that failed to parse; the parser synchronized past it.
    Error(Span),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Func(d) => d.span,
            Decl::Data(d) => d.span,
            Decl::Enum(d) => d.span,
            Decl::TypeAlias(d) => d.span,
            Decl::Import(d) => d.span,
            Decl::Error(span) => *span,
        }
    }
}

/// `Rule name of T using E given params, produce Ret, it performs ...: body`
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub type_params: Vec<String>,
    pub effect_params: Vec<String>,
    pub params: Vec<Field>,
    pub ret: TypeExpr,
    pub declared_effects: Vec<Effect>,
    pub body: Block,
    pub span: Span,
}

/// `Define Name [of T ...] has fields.`
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
    pub span: Span,
}

/// `Define Name as one of A, B.`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub variants: Vec<(String, Span)>,
    pub span: Span,
}

/// `Define Name as Type.`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub target: TypeExpr,
    pub span: Span,
}

/// `Use path.`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: QualifiedName,
    pub span: Span,
}

/// A field or parameter, explicit (`name: Type`) or inferred (`name`),
/// with optional constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub constraints: Vec<Constraint>,
    /// True when the type was picked from the field name rather than
    /// written by the user. Lowering resolves and drops this marker.
    pub type_inferred: bool,
    pub span: Span,
}

/// A numeric constraint bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Required,
    Range {
        min: Option<Number>,
        max: Option<Number>,
    },
    Pattern {
        regexp: String,
    },
}

/// A surface type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A named type: scalar, user type, or not-yet-classified name.
    Name { name: String, span: Span },
    /// A type variable declared in the enclosing header's `of` list.
    Var { name: String, span: Span },
    /// A user generic application: `Pair of A and B`.
    App {
        base: String,
        args: Vec<TypeExpr>,
        span: Span,
    },
    /// `rule given T1 and T2 produce R performs ...`
    Func {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        effects: Vec<Effect>,
        span: Span,
    },
    List { item: Box<TypeExpr>, span: Span },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    Option { item: Box<TypeExpr>, span: Span },
    Maybe { item: Box<TypeExpr>, span: Span },
    Result {
        ok: Box<TypeExpr>,
        err: Box<TypeExpr>,
        span: Span,
    },
    Pii { item: Box<TypeExpr>, span: Span },
    Error { span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Name { span, .. }
            | TypeExpr::Var { span, .. }
            | TypeExpr::App { span, .. }
            | TypeExpr::Func { span, .. }
            | TypeExpr::List { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Option { span, .. }
            | TypeExpr::Maybe { span, .. }
            | TypeExpr::Result { span, .. }
            | TypeExpr::Pii { span, .. }
            | TypeExpr::Error { span } => *span,
        }
    }
}

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `Let name be expr.`
    Let {
        name: String,
        value: Expr,
        span: Span,
    },
    /// `Return [expr].`
    Return { value: Option<Expr>, span: Span },
    /// `expr.`
    Expr { expr: Expr, span: Span },
    /// `If cond: ... [Otherwise: ...]`
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },
    /// `Match expr: When pattern: ... [Otherwise: ...]`
    Match {
        scrutinee: Expr,
        arms: Vec<MatchArm>,
        span: Span,
    },
    /// `Start task as async call.`
    Start {
        task: String,
        call: Expr,
        span: Span,
    },
    /// `Wait for task.`
    Wait { task: String, span: Span },
    /// `Try: ... Catch name: ...`
    Try {
        body: Block,
        catch_name: String,
        handler: Block,
        span: Span,
    },
    /// `Workflow: ...`
    Workflow { body: Block, span: Span },
    /// A statement that failed to parse.
    Error { span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Match { span, .. }
            | Stmt::Start { span, .. }
            | Stmt::Wait { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Workflow { span, .. }
            | Stmt::Error { span } => *span,
        }
    }
}

/// One arm of a statement-level `Match`. Default arms (`Otherwise:`) use a
/// wildcard pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Int { value: i64, span: Span },
    Str { value: String, span: Span },
    Bool { value: bool, span: Span },
    /// A lowercase name: binds the scrutinee.
    Bind { name: String, span: Span },
    /// `Some of x`, `None`, `Ok of v`, `Err of e`, or an enum variant.
    Variant {
        name: String,
        bind: Option<String>,
        span: Span,
    },
    Wildcard { span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Int { span, .. }
            | Pattern::Str { span, .. }
            | Pattern::Bool { span, .. }
            | Pattern::Bind { span, .. }
            | Pattern::Variant { span, .. }
            | Pattern::Wildcard { span } => *span,
        }
    }
}

/// Word operators. Lowering rewrites these into canonical call nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    And,
    Or,
}

impl BinOp {
    /// The canonical operator symbol used in Core IR call nodes.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str { value: String, span: Span },
    Int { value: i64, span: Span },
    Long { value: i64, span: Span },
    Double { value: f64, span: Span },
    Bool { value: bool, span: Span },
    /// `nothing`
    Null { span: Span },
    Name { name: String, span: Span },
    /// `Type with field: expr, ...`
    Construct {
        ty: String,
        fields: Vec<(String, Expr)>,
        span: Span,
    },
    Call {
        callee: QualifiedName,
        args: Vec<Expr>,
        span: Span,
    },
    Ok { inner: Box<Expr>, span: Span },
    Err { inner: Box<Expr>, span: Span },
    Some { inner: Box<Expr>, span: Span },
    None { span: Span },
    /// `match e when p then e1, ... [otherwise e]`
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<(Pattern, Expr)>,
        default: Option<Box<Expr>>,
        span: Span,
    },
    /// `given x and y produce body`
    Lambda {
        params: Vec<(String, Span)>,
        body: Box<Expr>,
        span: Span,
    },
    /// `if c then a otherwise b`
    If {
        cond: Box<Expr>,
        then_value: Box<Expr>,
        else_value: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    /// `not e`
    Not { inner: Box<Expr>, span: Span },
    Error { span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
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
            | Expr::If { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Not { span, .. }
            | Expr::Error { span } => *span,
        }
    }
}
