//! Type checking errors

use sumlint_ast::Span;
use thiserror::Error;

/// Errors that make a unit impossible to model.
///
/// Expression typing never fails: an expression the model cannot type just
/// has no recorded type. Only declarations and type expressions produce
/// errors.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("undefined: {name}")]
    UndefinedName { name: String, span: Span },

    #[error("{name} is not a type")]
    NotAType { name: String, span: Span },

    #[error("{name} redeclared in this block")]
    DuplicateDecl { name: String, span: Span },

    #[error("invalid receiver type {name}")]
    InvalidReceiver { name: String, span: Span },

    #[error("invalid recursive type alias {name}")]
    CyclicAlias { name: String, span: Span },

    #[error("package {found}; expected package {expected}")]
    PackageMismatch {
        expected: String,
        found: String,
        span: Span,
    },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UndefinedName { span, .. } => *span,
            TypeError::NotAType { span, .. } => *span,
            TypeError::DuplicateDecl { span, .. } => *span,
            TypeError::InvalidReceiver { span, .. } => *span,
            TypeError::CyclicAlias { span, .. } => *span,
            TypeError::PackageMismatch { span, .. } => *span,
        }
    }
}
