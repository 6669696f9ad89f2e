//! Expression AST nodes

use serde::{Deserialize, Serialize};
use crate::{Block, FuncSig, Ident, Span, TypeExpr};

/// An expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    /// Literal value: `42`, `"hello"`, `'x'`
    Literal(Literal),

    /// Identifier: `x`, `nil`, `true`
    Ident(String),

    /// Parenthesized expression: `(x)`
    Paren(Box<Expr>),

    /// Selector: `msg.GetPayload`, `sum.A`
    Selector { base: Box<Expr>, field: Ident },

    /// Call or conversion: `f(a, b...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// Trailing `...` on the last argument
        spread: bool,
    },

    /// Index: `xs[0]`, `m[k]`
    Index { base: Box<Expr>, index: Box<Expr> },

    /// Slice expression: `xs[lo:hi]`
    SliceExpr {
        base: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },

    /// Type assertion `x.(T)`; `ty` is `None` for the `x.(type)` guard
    TypeAssert { base: Box<Expr>, ty: Option<TypeExpr> },

    /// Unary operation: `!x`, `&v`, `*p`, `<-ch`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation: `a + b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Composite literal: `A{}`, `[]int{1, 2}`; the type is elided for
    /// nested literals such as the inner braces of `[]A{{}}`
    Composite {
        ty: Option<TypeExpr>,
        elements: Vec<Element>,
    },

    /// Function literal: `func(x int) bool { ... }`
    FuncLit { sig: FuncSig, body: Block },

    /// A type in expression position: `[]int` in `make([]int, n)`
    Type(TypeExpr),
}

impl Expr {
    /// The expression with any enclosing parentheses removed
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// An element of a composite literal: `value` or `key: value`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

/// Literal values, kept as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(String),
    Float(String),
    String(String),
    Rune(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `&x`
    Addr,
    /// `*p`
    Deref,
    /// `<-ch`
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    BitOr,
    BitXor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::BitOr | BinaryOp::BitXor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::BitAnd
            | BinaryOp::AndNot => 5,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }
}
