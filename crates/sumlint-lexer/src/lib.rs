//! sumlint Lexer - Tokenization using logos
//!
//! Newlines are significant: a line break after a token that can end a
//! statement becomes an implicit `;`, so the parser only ever sees explicit
//! separators.

mod token;

pub use token::*;

use logos::Logos;
use sumlint_ast::Span;

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        match kind {
            TokenKind::Newline => terminate_line(&mut tokens, span),
            TokenKind::BlockComment => {
                if lexer.slice().contains('\n') {
                    terminate_line(&mut tokens, span);
                }
            }
            _ => tokens.push(Token { kind, span }),
        }
    }

    // The last line needs no trailing newline
    let end = source.len();
    terminate_line(&mut tokens, Span::new(end, end));
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

fn terminate_line(tokens: &mut Vec<Token>, span: Span) {
    if tokens.last().is_some_and(|t| t.kind.ends_statement()) {
        tokens.push(Token {
            kind: TokenKind::Semicolon,
            span,
        });
    }
}

/// A token with its span
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}
