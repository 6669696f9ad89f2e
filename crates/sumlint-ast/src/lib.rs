//! sumlint AST - syntax tree for the analyzed source subset
//!
//! This crate defines the syntax tree produced by `sumlint-parser`:
//! declarations, statements, expressions and type expressions, each
//! carrying a byte span into its source file. All nodes are serializable
//! so the tree can be dumped as JSON for inspection.

mod span;
mod types;
mod expr;
mod stmt;
mod decl;
pub mod visit;

pub use span::*;
pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;

use serde::{Deserialize, Serialize};

/// An identifier with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// The blank identifier `_`
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// One parsed source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Name from the `package` clause
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

impl SourceFile {
    /// Top-level type declarations in source order
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclarationKind::Type(spec) => Some(spec),
            _ => None,
        })
    }

    /// Function and method declarations in source order
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclarationKind::Func(func) => Some(func),
            _ => None,
        })
    }
}
