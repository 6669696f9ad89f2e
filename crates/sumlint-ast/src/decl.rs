//! Declaration AST nodes (top-level items)

use serde::{Deserialize, Serialize};
use crate::{Block, Expr, FuncSig, Ident, Span, TypeExpr};

/// An import of another compilation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Explicit local name: `import one "example.com/one_of"`
    pub alias: Option<Ident>,
    /// Import path without quotes
    pub path: String,
    pub span: Span,
}

/// A top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// Type declaration: `type SumFoo interface { sumFoo() }`
    Type(TypeSpec),

    /// Function or method declaration
    Func(FuncDecl),

    /// Package-level variable: `var x SumFoo`
    Var(ValueSpec),

    /// Package-level constant: `const n = 4`
    Const(ValueSpec),
}

/// Type declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B` declares an alias rather than a new named type
    pub is_alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Function declaration, with a receiver when it declares a method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub sig: FuncSig,
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Method receiver: `(r *T)`, `(T)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Variable or constant specification: `var a, b int = 1, 2`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}
