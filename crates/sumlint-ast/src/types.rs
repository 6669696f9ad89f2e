//! Type expressions as written in source

use serde::{Deserialize, Serialize};
use crate::{Ident, Span};

/// A type expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeExprKind {
    /// Unqualified name: `SumFoo`, `int`, `nil` in a type switch case
    Name(Ident),

    /// Qualified name: `sum.SumFoo`
    Qualified { package: Ident, name: Ident },

    /// Pointer type: `*T`
    Pointer(Box<TypeExpr>),

    /// Slice type: `[]T`
    Slice(Box<TypeExpr>),

    /// Array type: `[4]T`; the length is kept as written
    Array { len: String, elem: Box<TypeExpr> },

    /// Map type: `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },

    /// Channel type: `chan T`
    Chan(Box<TypeExpr>),

    /// Struct type: `struct { A int; B }`
    Struct(Vec<FieldDecl>),

    /// Interface type: `interface { sumFoo(); io.Reader }`
    Interface(Vec<InterfaceElem>),

    /// Function type: `func(int) error`
    Func(FuncSig),

    /// Parenthesized type: `(*T)`
    Paren(Box<TypeExpr>),
}

impl TypeExpr {
    /// The type with any enclosing parentheses removed
    pub fn unparen(&self) -> &TypeExpr {
        match &self.kind {
            TypeExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }
}

/// A field in a struct type. An empty `names` list marks an embedded field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// An element of an interface type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InterfaceElem {
    /// Method specification: `sumFoo()`
    Method { name: Ident, sig: FuncSig, span: Span },

    /// Embedded interface: `io.Reader`
    Embedded(TypeExpr),
}

/// Parameters and results of a function or method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncSig {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub span: Span,
}

/// A single parameter or result. Grouped names (`a, b int`) are expanded
/// into one `Param` each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    pub variadic: bool,
    pub span: Span,
}
