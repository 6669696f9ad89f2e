//! Parser error types

use sumlint_ast::Span;
use sumlint_lexer::TokenKind;
use thiserror::Error;

/// Syntax errors; every variant carries the span it was found at
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("syntax error: unexpected end of file")]
    UnexpectedEof { span: Span },

    #[error("syntax error: malformed expression")]
    InvalidExpression { span: Span },

    #[error("syntax error: malformed type")]
    InvalidType { span: Span },

    #[error("syntax error: non-declaration statement outside function body")]
    ExpectedDeclaration { span: Span },

    #[error("unsupported syntax: {construct}")]
    Unsupported { construct: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEof { span }
            | Self::InvalidExpression { span }
            | Self::InvalidType { span }
            | Self::ExpectedDeclaration { span }
            | Self::Unsupported { span, .. } => *span,
        }
    }

    /// `found` at EOF becomes `UnexpectedEof`
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return ParseError::UnexpectedEof { span };
        }
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }

    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        ParseError::Unsupported {
            construct: construct.into(),
            span,
        }
    }
}
