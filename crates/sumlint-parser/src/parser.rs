//! Recursive descent parser implementation

use sumlint_ast::*;
use sumlint_lexer::{Token, TokenKind};

use crate::ParseError;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Cleared while parsing `if`/`for`/`switch` headers, where `T {` opens
    /// the body rather than a composite literal
    composite_ok: bool,
}

/// Result of a simple statement in a `for` header, which may turn out to be
/// a range clause
enum SimpleStmt {
    Stmt(Statement),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        iterable: Expr,
        span: Span,
    },
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            composite_ok: true,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => *token,
            None => self.eof(),
        }
    }

    fn eof(&self) -> Token {
        let end = self.source.len();
        Token {
            kind: TokenKind::Eof,
            span: Span::new(end, end),
        }
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token
    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => self.span(),
        }
    }

    fn ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.consume(TokenKind::Ident)?;
        Ok(Ident::new(self.text(&token), token.span))
    }

    /// Statement terminator; may be omitted before a closing `)` or `}`
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semicolon)
            || self.at_any(&[TokenKind::RParen, TokenKind::RBrace, TokenKind::Eof])
        {
            Ok(())
        } else {
            Err(ParseError::unexpected("';' or newline", self.peek(), self.span()))
        }
    }

    fn with_composites<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.composite_ok;
        self.composite_ok = allowed;
        let result = f(self);
        self.composite_ok = saved;
        result
    }

    // === Source file ===

    pub fn parse_file(&mut self) -> Result<SourceFile, ParseError> {
        let start = self.span();
        self.consume(TokenKind::Package)?;
        let package = self.ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        while self.at(TokenKind::Import) {
            self.parse_import_decl(&mut imports)?;
            self.expect_semi()?;
        }

        let mut declarations = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            self.parse_declaration(&mut declarations)?;
            self.expect_semi()?;
        }

        Ok(SourceFile {
            package,
            imports,
            declarations,
            span: start.merge(self.span()),
        })
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        self.consume(TokenKind::Import)?;
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) {
                imports.push(self.parse_import_spec()?);
                self.expect_semi()?;
            }
            self.consume(TokenKind::RParen)?;
        } else {
            imports.push(self.parse_import_spec()?);
        }
        Ok(())
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let start = self.span();
        let alias = match self.peek() {
            TokenKind::Ident => Some(self.ident()?),
            TokenKind::Dot => {
                return Err(ParseError::unsupported("dot import", self.span()));
            }
            _ => None,
        };
        let path_token = match self.peek() {
            TokenKind::String | TokenKind::RawString => self.advance(),
            found => return Err(ParseError::unexpected("import path", found, self.span())),
        };
        let path = unquote(self.text(&path_token));

        Ok(ImportSpec {
            alias,
            path,
            span: start.merge(path_token.span),
        })
    }

    // === Declarations ===

    fn parse_declaration(&mut self, out: &mut Vec<Declaration>) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Type => {
                self.advance();
                self.parse_group(out, |p| {
                    let spec = p.parse_type_spec()?;
                    let span = spec.span;
                    Ok(Declaration {
                        kind: DeclarationKind::Type(spec),
                        span,
                    })
                })
            }
            TokenKind::Var | TokenKind::Const => {
                let is_const = self.advance().kind == TokenKind::Const;
                self.parse_group(out, |p| {
                    let spec = p.parse_value_spec()?;
                    let span = spec.span;
                    let kind = if is_const {
                        DeclarationKind::Const(spec)
                    } else {
                        DeclarationKind::Var(spec)
                    };
                    Ok(Declaration { kind, span })
                })
            }
            TokenKind::Func => {
                let func = self.parse_func_decl()?;
                let span = func.span;
                out.push(Declaration {
                    kind: DeclarationKind::Func(func),
                    span,
                });
                Ok(())
            }
            TokenKind::Import => Err(ParseError::unexpected(
                "declaration",
                TokenKind::Import,
                self.span(),
            )),
            _ => Err(ParseError::ExpectedDeclaration { span: self.span() }),
        }
    }

    /// Single spec or a parenthesized group of specs after `type`/`var`/`const`
    fn parse_group<T>(
        &mut self,
        out: &mut Vec<T>,
        mut spec: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(), ParseError> {
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) {
                if self.eat(TokenKind::Semicolon) {
                    continue;
                }
                out.push(spec(self)?);
                self.expect_semi()?;
            }
            self.consume(TokenKind::RParen)?;
        } else {
            out.push(spec(self)?);
        }
        Ok(())
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let name = self.ident()?;
        if self.at(TokenKind::LBracket)
            && self.peek_ahead(1) == TokenKind::Ident
            && matches!(self.peek_ahead(2), TokenKind::Ident | TokenKind::Comma | TokenKind::Interface)
        {
            return Err(ParseError::unsupported("type parameters", self.span()));
        }
        let is_alias = self.eat(TokenKind::Eq);
        let ty = self.parse_type()?;
        let span = name.span.merge(ty.span);
        Ok(TypeSpec {
            name,
            is_alias,
            ty,
            span,
        })
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec, ParseError> {
        let start = self.span();
        let mut names = vec![self.ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?);
        }
        let ty = if self.at_any(&[TokenKind::Eq, TokenKind::Semicolon, TokenKind::RParen]) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.eat(TokenKind::Eq) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(ValueSpec {
            names,
            ty,
            values,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let start = self.span();
        self.consume(TokenKind::Func)?;

        let receiver = if self.at(TokenKind::LParen) {
            let recv_start = self.span();
            let mut params = self.parse_params()?;
            if params.len() != 1 {
                return Err(ParseError::unexpected(
                    "single receiver",
                    TokenKind::Comma,
                    recv_start.merge(self.prev_span()),
                ));
            }
            let param = params.remove(0);
            Some(Receiver {
                name: param.name,
                ty: param.ty,
                span: recv_start.merge(self.prev_span()),
            })
        } else {
            None
        };

        let name = self.ident()?;
        let sig = self.parse_signature()?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            receiver,
            name,
            sig,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    // === Signatures ===

    fn parse_signature(&mut self) -> Result<FuncSig, ParseError> {
        let start = self.span();
        let params = self.parse_params()?;
        let results = if self.at(TokenKind::LParen) {
            self.parse_params()?
        } else if self.at_type_start() {
            let ty = self.parse_type()?;
            let span = ty.span;
            vec![Param {
                name: None,
                ty,
                variadic: false,
                span,
            }]
        } else {
            Vec::new()
        };
        Ok(FuncSig {
            params,
            results,
            span: start.merge(self.prev_span()),
        })
    }

    fn at_type_start(&self) -> bool {
        self.at_any(&[
            TokenKind::Ident,
            TokenKind::Star,
            TokenKind::LBracket,
            TokenKind::Map,
            TokenKind::Chan,
            TokenKind::Struct,
            TokenKind::Interface,
            TokenKind::Func,
            TokenKind::Arrow,
        ])
    }

    /// Parameter list in parentheses.
    ///
    /// Entries are first read as `[name] type`; a name is only recognized
    /// when an identifier is followed by something other than `,` `)` `.`.
    /// If any entry turned out to be named, the bare entries before it are
    /// names sharing its type (`a, b int`).
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.consume(TokenKind::LParen)?;
        let mut entries: Vec<Param> = Vec::new();
        while !self.at(TokenKind::RParen) {
            let start = self.span();
            let named = self.at(TokenKind::Ident)
                && !matches!(
                    self.peek_ahead(1),
                    TokenKind::Comma | TokenKind::RParen | TokenKind::Dot
                );
            let name = if named { Some(self.ident()?) } else { None };
            let variadic = self.eat(TokenKind::Ellipsis);
            let ty = self.parse_type()?;
            entries.push(Param {
                name,
                ty,
                variadic,
                span: start.merge(self.prev_span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;

        if entries.iter().all(|p| p.name.is_none()) {
            return Ok(entries);
        }

        let mut params = Vec::with_capacity(entries.len());
        let mut pending: Vec<(Ident, Span)> = Vec::new();
        for entry in entries {
            match entry.name {
                Some(name) => {
                    for (pending_name, span) in pending.drain(..) {
                        params.push(Param {
                            name: Some(pending_name),
                            ty: entry.ty.clone(),
                            variadic: entry.variadic,
                            span,
                        });
                    }
                    params.push(Param {
                        name: Some(name),
                        ..entry
                    });
                }
                None => match entry.ty.kind {
                    TypeExprKind::Name(ident) if !entry.variadic => pending.push((ident, entry.span)),
                    _ => return Err(ParseError::InvalidType { span: entry.span }),
                },
            }
        }
        if let Some((_, span)) = pending.first() {
            return Err(ParseError::InvalidType { span: *span });
        }
        Ok(params)
    }

    // === Types ===

    pub fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.span();
        let kind = match self.peek() {
            TokenKind::Ident => {
                let first = self.ident()?;
                if self.at(TokenKind::Dot) && self.peek_ahead(1) == TokenKind::Ident {
                    self.advance();
                    let name = self.ident()?;
                    TypeExprKind::Qualified {
                        package: first,
                        name,
                    }
                } else {
                    TypeExprKind::Name(first)
                }
            }
            TokenKind::Star => {
                self.advance();
                TypeExprKind::Pointer(Box::new(self.parse_type()?))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.eat(TokenKind::RBracket) {
                    TypeExprKind::Slice(Box::new(self.parse_type()?))
                } else {
                    let len = if self.at(TokenKind::Ellipsis) {
                        self.advance();
                        "...".to_string()
                    } else {
                        let len_expr = self.with_composites(true, |p| p.parse_expr())?;
                        self.source[len_expr.span.start..len_expr.span.end].to_string()
                    };
                    self.consume(TokenKind::RBracket)?;
                    TypeExprKind::Array {
                        len,
                        elem: Box::new(self.parse_type()?),
                    }
                }
            }
            TokenKind::Map => {
                self.advance();
                self.consume(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.consume(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                TypeExprKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TokenKind::Chan | TokenKind::Arrow => {
                // `<-chan T`, `chan<- T` and `chan T` all carry the element type
                self.eat(TokenKind::Arrow);
                self.consume(TokenKind::Chan)?;
                self.eat(TokenKind::Arrow);
                TypeExprKind::Chan(Box::new(self.parse_type()?))
            }
            TokenKind::Struct => {
                self.advance();
                TypeExprKind::Struct(self.parse_struct_fields()?)
            }
            TokenKind::Interface => {
                self.advance();
                TypeExprKind::Interface(self.parse_interface_elems()?)
            }
            TokenKind::Func => {
                self.advance();
                TypeExprKind::Func(self.parse_signature()?)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RParen)?;
                TypeExprKind::Paren(Box::new(inner))
            }
            TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: start }),
            _ => return Err(ParseError::InvalidType { span: start }),
        };
        Ok(TypeExpr {
            kind,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        self.consume(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let start = self.span();
            let embedded = self.at(TokenKind::Star)
                || (self.at(TokenKind::Ident)
                    && matches!(
                        self.peek_ahead(1),
                        TokenKind::Semicolon
                            | TokenKind::RBrace
                            | TokenKind::Dot
                            | TokenKind::String
                            | TokenKind::RawString
                    ));
            let mut names = Vec::new();
            if !embedded {
                names.push(self.ident()?);
                while self.eat(TokenKind::Comma) {
                    names.push(self.ident()?);
                }
            }
            let ty = self.parse_type()?;
            let tag = match self.peek() {
                TokenKind::String | TokenKind::RawString => {
                    let token = self.advance();
                    Some(self.text(&token).to_string())
                }
                _ => None,
            };
            fields.push(FieldDecl {
                names,
                ty,
                tag,
                span: start.merge(self.prev_span()),
            });
            self.expect_semi()?;
        }
        self.consume(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_interface_elems(&mut self) -> Result<Vec<InterfaceElem>, ParseError> {
        self.consume(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let start = self.span();
            if self.at(TokenKind::Ident) && self.peek_ahead(1) == TokenKind::LParen {
                let name = self.ident()?;
                let sig = self.parse_signature()?;
                elems.push(InterfaceElem::Method {
                    name,
                    sig,
                    span: start.merge(self.prev_span()),
                });
            } else {
                let ty = self.parse_type()?;
                if self.at(TokenKind::Pipe) {
                    return Err(ParseError::unsupported("type set", self.span()));
                }
                elems.push(InterfaceElem::Embedded(ty));
            }
            self.expect_semi()?;
        }
        self.consume(TokenKind::RBrace)?;
        Ok(elems)
    }

    // === Statements ===

    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.span();
        self.consume(TokenKind::LBrace)?;
        let statements = self.with_composites(true, |p| p.parse_stmt_list())?;
        self.consume(TokenKind::RBrace)?;
        Ok(Block {
            statements,
            span: start.merge(self.prev_span()),
        })
    }

    /// Statements up to a closing `}` or the next `case`/`default`
    fn parse_stmt_list(&mut self) -> Result<Vec<Statement>, ParseError> {
        const TERMINATORS: [TokenKind; 4] = [
            TokenKind::RBrace,
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::Eof,
        ];
        let mut statements = Vec::new();
        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.at_any(&TERMINATORS) {
                break;
            }
            if self.at_any(&[TokenKind::Var, TokenKind::Const]) {
                // Grouped local declarations become one statement per spec
                let mut specs = Vec::new();
                self.advance();
                self.parse_group(&mut specs, |p| p.parse_value_spec())?;
                statements.extend(specs.into_iter().map(|spec| Statement {
                    span: spec.span,
                    kind: StatementKind::Var(spec),
                }));
            } else {
                statements.push(self.parse_statement()?);
            }
            if !self.at_any(&TERMINATORS) {
                self.expect_semi()?;
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.span();
        let kind = match self.peek() {
            TokenKind::LBrace => StatementKind::Block(self.parse_block()?),
            TokenKind::Return => {
                self.advance();
                let values = if self.at_any(&[
                    TokenKind::Semicolon,
                    TokenKind::RBrace,
                    TokenKind::Case,
                    TokenKind::Default,
                ]) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                StatementKind::Return(values)
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::For => return self.parse_for(),
            TokenKind::Switch => return self.parse_switch(),
            TokenKind::Break | TokenKind::Continue | TokenKind::Fallthrough => {
                let kind = match self.advance().kind {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    _ => BranchKind::Fallthrough,
                };
                // Labels are accepted and ignored
                self.eat(TokenKind::Ident);
                StatementKind::Branch(kind)
            }
            TokenKind::Go => {
                self.advance();
                StatementKind::Go(self.parse_expr()?)
            }
            TokenKind::Defer => {
                self.advance();
                StatementKind::Defer(self.parse_expr()?)
            }
            _ => match self.parse_simple_stmt(false)? {
                SimpleStmt::Stmt(stmt) => return Ok(stmt),
                SimpleStmt::Range { span, .. } => {
                    return Err(ParseError::InvalidExpression { span });
                }
            },
        };
        Ok(Statement {
            kind,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_simple_stmt(&mut self, range_ok: bool) -> Result<SimpleStmt, ParseError> {
        let start = self.span();

        if range_ok && self.eat(TokenKind::Range) {
            let iterable = self.parse_expr()?;
            return Ok(SimpleStmt::Range {
                key: None,
                value: None,
                define: false,
                span: start.merge(iterable.span),
                iterable,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        let kind = match self.peek() {
            TokenKind::ColonEq | TokenKind::Eq => {
                let define = self.advance().kind == TokenKind::ColonEq;
                if range_ok && self.eat(TokenKind::Range) {
                    if lhs.len() > 2 {
                        return Err(ParseError::InvalidExpression { span: start });
                    }
                    let iterable = self.parse_expr()?;
                    let mut targets = lhs.into_iter();
                    return Ok(SimpleStmt::Range {
                        key: targets.next(),
                        value: targets.next(),
                        define,
                        span: start.merge(iterable.span),
                        iterable,
                    });
                }
                let values = self.parse_expr_list()?;
                if define {
                    let names = lhs
                        .iter()
                        .map(|expr| match &expr.kind {
                            ExprKind::Ident(name) => Ok(Ident::new(name.clone(), expr.span)),
                            _ => Err(ParseError::InvalidExpression { span: expr.span }),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    StatementKind::Define { names, values }
                } else {
                    StatementKind::Assign {
                        targets: lhs,
                        op: AssignOp::Assign,
                        values,
                    }
                }
            }
            kind if assign_op(kind).is_some() => {
                let op = assign_op(self.advance().kind).unwrap_or(AssignOp::Assign);
                let values = self.parse_expr_list()?;
                StatementKind::Assign {
                    targets: lhs,
                    op,
                    values,
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let increment = self.advance().kind == TokenKind::PlusPlus;
                if lhs.len() != 1 {
                    return Err(ParseError::InvalidExpression { span: start });
                }
                StatementKind::IncDec {
                    target: lhs.remove(0),
                    increment,
                }
            }
            TokenKind::Arrow => {
                return Err(ParseError::unsupported("send statement", self.span()));
            }
            TokenKind::Colon if lhs.len() == 1 && lhs[0].as_ident().is_some() => {
                return Err(ParseError::unsupported("labeled statement", start));
            }
            _ => {
                if lhs.len() != 1 {
                    return Err(ParseError::unexpected("':=' or '='", self.peek(), self.span()));
                }
                StatementKind::Expr(lhs.remove(0))
            }
        };
        Ok(SimpleStmt::Stmt(Statement {
            kind,
            span: start.merge(self.prev_span()),
        }))
    }

    fn simple_stmt(&mut self) -> Result<Statement, ParseError> {
        match self.parse_simple_stmt(false)? {
            SimpleStmt::Stmt(stmt) => Ok(stmt),
            SimpleStmt::Range { span, .. } => Err(ParseError::InvalidExpression { span }),
        }
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.span();
        self.consume(TokenKind::If)?;

        let (init, cond) = self.with_composites(false, |p| {
            let first = p.simple_stmt()?;
            if p.eat(TokenKind::Semicolon) {
                let cond = p.parse_expr()?;
                Ok((Some(Box::new(first)), cond))
            } else {
                match first.kind {
                    StatementKind::Expr(cond) => Ok((None, cond)),
                    _ => Err(ParseError::InvalidExpression { span: first.span }),
                }
            }
        })?;

        let then = self.parse_block()?;
        let otherwise = if self.eat(TokenKind::Else) {
            if self.at(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Box::new(Statement {
                    kind: StatementKind::Block(block),
                    span,
                }))
            }
        } else {
            None
        };

        Ok(Statement {
            kind: StatementKind::If {
                init,
                cond,
                then,
                otherwise,
            },
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.span();
        self.consume(TokenKind::For)?;

        enum Header {
            Loop(Option<Box<Statement>>, Option<Expr>, Option<Box<Statement>>),
            Range(Option<Expr>, Option<Expr>, bool, Expr),
        }

        let header = self.with_composites(false, |p| {
            if p.at(TokenKind::LBrace) {
                return Ok(Header::Loop(None, None, None));
            }
            let first = if p.at(TokenKind::Semicolon) {
                None
            } else {
                match p.parse_simple_stmt(true)? {
                    SimpleStmt::Range {
                        key,
                        value,
                        define,
                        iterable,
                        ..
                    } => return Ok(Header::Range(key, value, define, iterable)),
                    SimpleStmt::Stmt(stmt) => Some(stmt),
                }
            };

            if p.eat(TokenKind::Semicolon) {
                let cond = if p.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(p.parse_expr()?)
                };
                p.consume(TokenKind::Semicolon)?;
                let post = if p.at(TokenKind::LBrace) {
                    None
                } else {
                    Some(Box::new(p.simple_stmt()?))
                };
                Ok(Header::Loop(first.map(Box::new), cond, post))
            } else {
                match first {
                    Some(Statement {
                        kind: StatementKind::Expr(cond),
                        ..
                    }) => Ok(Header::Loop(None, Some(cond), None)),
                    Some(stmt) => Err(ParseError::InvalidExpression { span: stmt.span }),
                    None => Err(ParseError::InvalidExpression { span: p.span() }),
                }
            }
        })?;

        let body = self.parse_block()?;
        let kind = match header {
            Header::Loop(init, cond, post) => StatementKind::For {
                init,
                cond,
                post,
                body,
            },
            Header::Range(key, value, define, iterable) => StatementKind::Range {
                key,
                value,
                define,
                iterable,
                body,
            },
        };
        Ok(Statement {
            kind,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_switch(&mut self) -> Result<Statement, ParseError> {
        let start = self.span();
        let keyword = self.consume(TokenKind::Switch)?.span;

        let (init, guard) = self.with_composites(false, |p| {
            if p.at(TokenKind::LBrace) {
                return Ok((None, None));
            }
            let first = if p.at(TokenKind::Semicolon) {
                None
            } else {
                Some(p.simple_stmt()?)
            };
            if p.eat(TokenKind::Semicolon) {
                let guard = if p.at(TokenKind::LBrace) {
                    None
                } else {
                    Some(p.simple_stmt()?)
                };
                Ok((first.map(Box::new), guard))
            } else {
                Ok((None, first))
            }
        })?;

        if let Some(guard) = guard.as_ref().filter(|g| has_parenthesized_guard(g)) {
            return Err(ParseError::InvalidExpression { span: guard.span });
        }
        let is_type_switch = guard.as_ref().is_some_and(is_type_switch_guard);

        self.consume(TokenKind::LBrace)?;
        let kind = if is_type_switch {
            let mut clauses = Vec::new();
            while !self.at(TokenKind::RBrace) {
                let clause_start = self.span();
                let types = if self.eat(TokenKind::Default) {
                    None
                } else {
                    self.consume(TokenKind::Case)?;
                    let mut types = vec![self.parse_type()?];
                    while self.eat(TokenKind::Comma) {
                        types.push(self.parse_type()?);
                    }
                    Some(types)
                };
                self.consume(TokenKind::Colon)?;
                let body = self.parse_stmt_list()?;
                clauses.push(TypeCaseClause {
                    types,
                    body,
                    span: clause_start.merge(self.prev_span()),
                });
            }
            self.consume(TokenKind::RBrace)?;
            let Some(guard) = guard else {
                return Err(ParseError::InvalidExpression { span: keyword });
            };
            StatementKind::TypeSwitch(TypeSwitchStmt {
                keyword,
                init,
                guard: Box::new(guard),
                clauses,
                span: start.merge(self.prev_span()),
            })
        } else {
            let tag = match guard {
                None => None,
                Some(Statement {
                    kind: StatementKind::Expr(tag),
                    ..
                }) => Some(tag),
                Some(stmt) => return Err(ParseError::InvalidExpression { span: stmt.span }),
            };
            let mut clauses = Vec::new();
            while !self.at(TokenKind::RBrace) {
                let clause_start = self.span();
                let exprs = if self.eat(TokenKind::Default) {
                    None
                } else {
                    self.consume(TokenKind::Case)?;
                    Some(self.parse_expr_list()?)
                };
                self.consume(TokenKind::Colon)?;
                let body = self.parse_stmt_list()?;
                clauses.push(CaseClause {
                    exprs,
                    body,
                    span: clause_start.merge(self.prev_span()),
                });
            }
            self.consume(TokenKind::RBrace)?;
            StatementKind::Switch { init, tag, clauses }
        };

        Ok(Statement {
            kind,
            span: start.merge(self.prev_span()),
        })
    }

    // === Expressions ===

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_op(self.peek()) {
            if op.precedence() < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            let span = left.span.merge(right.span);
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Caret => UnaryOp::BitNot,
            TokenKind::Amp => UnaryOp::Addr,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Arrow if self.peek_ahead(1) != TokenKind::Chan => UnaryOp::Recv,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr {
            span: start.merge(operand.span),
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_operand()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(TokenKind::LParen) {
                        let ty = if self.eat(TokenKind::Type) {
                            None
                        } else {
                            Some(self.parse_type()?)
                        };
                        self.consume(TokenKind::RParen)?;
                        expr = Expr {
                            span: expr.span.merge(self.prev_span()),
                            kind: ExprKind::TypeAssert {
                                base: Box::new(expr),
                                ty,
                            },
                        };
                    } else {
                        let field = self.ident()?;
                        expr = Expr {
                            span: expr.span.merge(field.span),
                            kind: ExprKind::Selector {
                                base: Box::new(expr),
                                field,
                            },
                        };
                    }
                }
                TokenKind::LParen => {
                    self.advance();
                    let (args, spread) = self.with_composites(true, |p| {
                        let mut args = Vec::new();
                        let mut spread = false;
                        while !p.at(TokenKind::RParen) {
                            args.push(p.parse_expr()?);
                            if p.eat(TokenKind::Ellipsis) {
                                spread = true;
                            }
                            if !p.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                        Ok((args, spread))
                    })?;
                    self.consume(TokenKind::RParen)?;
                    expr = Expr {
                        span: expr.span.merge(self.prev_span()),
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            spread,
                        },
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let (kind, start) =
                        self.with_composites(true, |p| p.parse_index_or_slice(expr))?;
                    self.consume(TokenKind::RBracket)?;
                    expr = Expr {
                        span: start.merge(self.prev_span()),
                        kind,
                    };
                }
                TokenKind::LBrace if self.composite_allowed(&expr) => {
                    let ty = expr_to_type(&expr).ok_or(ParseError::InvalidType { span: expr.span })?;
                    let (elements, end) = self.parse_composite_body()?;
                    expr = Expr {
                        span: expr.span.merge(end),
                        kind: ExprKind::Composite {
                            ty: Some(ty),
                            elements,
                        },
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_index_or_slice(&mut self, base: Expr) -> Result<(ExprKind, Span), ParseError> {
        let span = base.span;
        let low = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        if !self.eat(TokenKind::Colon) {
            let index = low.ok_or(ParseError::InvalidExpression { span })?;
            return Ok((
                ExprKind::Index {
                    base: Box::new(base),
                    index,
                },
                span,
            ));
        }
        let high = if self.at_any(&[TokenKind::RBracket, TokenKind::Colon]) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let max = if self.eat(TokenKind::Colon) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok((
            ExprKind::SliceExpr {
                base: Box::new(base),
                low,
                high,
                max,
            },
            span,
        ))
    }

    /// Bare type names only open a composite literal outside control
    /// clause headers; explicit type literals (`[]T{}`) always do.
    fn composite_allowed(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Type(_) => true,
            ExprKind::Ident(_) | ExprKind::Selector { .. } => {
                self.composite_ok && expr_to_type(expr).is_some()
            }
            _ => false,
        }
    }

    fn parse_composite_body(&mut self) -> Result<(Vec<Element>, Span), ParseError> {
        self.consume(TokenKind::LBrace)?;
        let elements = self.with_composites(true, |p| {
            let mut elements = Vec::new();
            while !p.at(TokenKind::RBrace) {
                let start = p.span();
                let first = p.parse_element_value()?;
                let element = if p.eat(TokenKind::Colon) {
                    let value = p.parse_element_value()?;
                    Element {
                        key: Some(first),
                        value,
                        span: start.merge(p.prev_span()),
                    }
                } else {
                    Element {
                        key: None,
                        value: first,
                        span: start.merge(p.prev_span()),
                    }
                };
                elements.push(element);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(elements)
        })?;
        let end = self.consume(TokenKind::RBrace)?.span;
        Ok((elements, end))
    }

    fn parse_element_value(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::LBrace) {
            let start = self.span();
            let (elements, end) = self.parse_composite_body()?;
            Ok(Expr {
                kind: ExprKind::Composite { ty: None, elements },
                span: start.merge(end),
            })
        } else {
            self.parse_expr()
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        let kind = match self.peek() {
            TokenKind::Int | TokenKind::Float | TokenKind::String | TokenKind::RawString | TokenKind::Rune => {
                let token = self.advance();
                let text = self.text(&token).to_string();
                ExprKind::Literal(match token.kind {
                    TokenKind::Int => Literal::Int(text),
                    TokenKind::Float => Literal::Float(text),
                    TokenKind::Rune => Literal::Rune(text),
                    _ => Literal::String(text),
                })
            }
            TokenKind::Ident => {
                let token = self.advance();
                ExprKind::Ident(self.text(&token).to_string())
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_composites(true, |p| p.parse_expr())?;
                self.consume(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                if self.at(TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    ExprKind::FuncLit { sig, body }
                } else {
                    let span = start.merge(sig.span);
                    ExprKind::Type(TypeExpr {
                        kind: TypeExprKind::Func(sig),
                        span,
                    })
                }
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Arrow => ExprKind::Type(self.parse_type()?),
            TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: start }),
            found => return Err(ParseError::unexpected("expression", found, start)),
        };
        Ok(Expr {
            kind,
            span: start.merge(self.prev_span()),
        })
    }
}

/// Whether a switch guard is `x.(type)`, alone or as the single value of
/// `:=` or `=`
fn is_type_switch_guard(stmt: &Statement) -> bool {
    type_switch_operand(stmt).is_some_and(is_type_guard)
}

/// `(x.(type))` is a `.(type)` outside a type switch guard
fn has_parenthesized_guard(stmt: &Statement) -> bool {
    type_switch_operand(stmt).is_some_and(|expr| {
        matches!(expr.kind, ExprKind::Paren(_)) && is_type_guard(expr.unparen())
    })
}

fn type_switch_operand(stmt: &Statement) -> Option<&Expr> {
    match &stmt.kind {
        StatementKind::Expr(expr) => Some(expr),
        StatementKind::Define { values, .. } | StatementKind::Assign { values, .. } => {
            match values.as_slice() {
                [value] => Some(value),
                _ => None,
            }
        }
        _ => None,
    }
}

fn is_type_guard(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::TypeAssert { ty: None, .. })
}

/// Reinterpret an expression as the type of a composite literal
fn expr_to_type(expr: &Expr) -> Option<TypeExpr> {
    let kind = match &expr.kind {
        ExprKind::Ident(name) => TypeExprKind::Name(Ident::new(name.clone(), expr.span)),
        ExprKind::Selector { base, field } => {
            let package = base.as_ident()?;
            TypeExprKind::Qualified {
                package: Ident::new(package, base.span),
                name: field.clone(),
            }
        }
        ExprKind::Type(ty) => return Some(ty.clone()),
        _ => return None,
    };
    Some(TypeExpr {
        kind,
        span: expr.span,
    })
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::AmpCaret => BinaryOp::AndNot,
        _ => return None,
    })
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Rem,
        TokenKind::AmpEq => AssignOp::And,
        TokenKind::PipeEq => AssignOp::Or,
        TokenKind::CaretEq => AssignOp::Xor,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::AmpCaretEq => AssignOp::AndNot,
        _ => return None,
    })
}

/// Strip the quotes from a string literal; escapes other than `\"` and
/// `\\` are kept verbatim since import paths never need them
fn unquote(text: &str) -> String {
    if let Some(raw) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
        return raw.to_string();
    }
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}
