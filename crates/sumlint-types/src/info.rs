//! Types recorded while checking a unit

use std::collections::{BTreeSet, HashMap};

use sumlint_ast::{Expr, Span, TypeExpr};

use crate::{Type, TypeName};

/// Index of a file within the slice passed to `check_package`
pub type FileId = usize;

/// The typed view of a unit: the type of every expression and type
/// expression the model could resolve, and the named types it refers to.
#[derive(Debug, Default)]
pub struct TypeInfo {
    types: HashMap<(FileId, Span), Type>,
    type_exprs: HashMap<(FileId, Span), Type>,
    uses: BTreeSet<TypeName>,
}

impl TypeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static type of a value expression
    pub fn type_of(&self, file: FileId, expr: &Expr) -> Option<&Type> {
        self.types.get(&(file, expr.span))
    }

    /// The type a type expression denotes
    pub fn type_of_type_expr(&self, file: FileId, ty: &TypeExpr) -> Option<&Type> {
        self.type_exprs.get(&(file, ty.span))
    }

    /// Named types referenced anywhere in the unit, in sorted order
    pub fn uses(&self) -> impl Iterator<Item = &TypeName> {
        self.uses.iter()
    }

    pub(crate) fn record_expr(&mut self, file: FileId, span: Span, ty: Type) {
        self.types.insert((file, span), ty);
    }

    pub(crate) fn record_type_expr(&mut self, file: FileId, span: Span, ty: &Type) {
        if let Type::Named(name) = ty {
            self.uses.insert(name.clone());
        }
        self.type_exprs.insert((file, span), ty.clone());
    }

    pub(crate) fn record_use(&mut self, name: &TypeName) {
        self.uses.insert(name.clone());
    }

    pub fn expr_count(&self) -> usize {
        self.types.len()
    }
}
