//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{Expr, Ident, Span, TypeExpr, ValueSpec};

/// A block of statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatementKind {
    /// Nested block: `{ ... }`
    Block(Block),

    /// Expression statement: `foo()`
    Expr(Expr),

    /// Local declaration: `var x SumFoo`, `const n = 1`
    Var(ValueSpec),

    /// Short variable declaration: `a, b := f()`
    Define { names: Vec<Ident>, values: Vec<Expr> },

    /// Assignment: `a = b`, `n += 1`
    Assign {
        targets: Vec<Expr>,
        op: AssignOp,
        values: Vec<Expr>,
    },

    /// Increment or decrement: `i++`
    IncDec { target: Expr, increment: bool },

    /// Return statement: `return x, nil`
    Return(Vec<Expr>),

    /// If statement: `if init; cond { } else { }`
    If {
        init: Option<Box<Statement>>,
        cond: Expr,
        then: Block,
        otherwise: Option<Box<Statement>>,
    },

    /// Three-clause, condition-only or infinite loop
    For {
        init: Option<Box<Statement>>,
        cond: Option<Expr>,
        post: Option<Box<Statement>>,
        body: Block,
    },

    /// Range loop: `for k, v := range xs { }`
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        /// `:=` rather than `=`
        define: bool,
        iterable: Expr,
        body: Block,
    },

    /// Expression switch: `switch tag { case a, b: }`
    Switch {
        init: Option<Box<Statement>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },

    /// Type switch: `switch v := x.(type) { case A: }`
    TypeSwitch(TypeSwitchStmt),

    /// `break`, `continue`, `fallthrough`
    Branch(BranchKind),

    /// `go f()`
    Go(Expr),

    /// `defer f()`
    Defer(Expr),

    /// A lone `;`
    Empty,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Fallthrough,
}

/// Clause of an expression switch; `exprs` is `None` for `default:`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseClause {
    pub exprs: Option<Vec<Expr>>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A switch on the dynamic type of a value.
///
/// The guard is kept as the statement that was written (`x.(type)` or
/// `v := x.(type)`) so that consumers can decide which shapes they accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSwitchStmt {
    /// Span of the `switch` keyword
    pub keyword: Span,
    pub init: Option<Box<Statement>>,
    pub guard: Box<Statement>,
    pub clauses: Vec<TypeCaseClause>,
    pub span: Span,
}

/// Clause of a type switch; `types` is `None` for `default:`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCaseClause {
    pub types: Option<Vec<TypeExpr>>,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl TypeCaseClause {
    pub fn is_default(&self) -> bool {
        self.types.is_none()
    }
}
