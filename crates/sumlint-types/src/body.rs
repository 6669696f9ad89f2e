//! Expression typing for function bodies and package-level initializers
//!
//! Typing is best-effort: every expression that can be typed gets an entry
//! in `TypeInfo`, anything else is left out. Only type expressions that do
//! not resolve are errors.

use std::collections::BTreeMap;

use sumlint_ast::*;

use crate::resolve::{Resolver, UnitDecls};
use crate::scope::ScopeStack;
use crate::{BasicKind, FileId, Interface, Selection, Signature, Type, TypeError, TypeInfo, Universe};

/// What a name or expression denotes
#[derive(Debug, Clone)]
enum Operand {
    Value(Type),
    TypeName(Type),
    Package(String),
    Builtin(Builtin),
    Unknown,
}

impl Operand {
    fn value(self) -> Option<Type> {
        match self {
            Operand::Value(ty) => Some(ty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Append,
    Cap,
    Clear,
    Close,
    Copy,
    Delete,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Recover,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "append" => Builtin::Append,
            "cap" => Builtin::Cap,
            "clear" => Builtin::Clear,
            "close" => Builtin::Close,
            "copy" => Builtin::Copy,
            "delete" => Builtin::Delete,
            "len" => Builtin::Len,
            "make" => Builtin::Make,
            "max" => Builtin::Max,
            "min" => Builtin::Min,
            "new" => Builtin::New,
            "panic" => Builtin::Panic,
            "print" => Builtin::Print,
            "println" => Builtin::Println,
            "recover" => Builtin::Recover,
            _ => return None,
        })
    }
}

pub(crate) struct BodyChecker<'a> {
    universe: &'a Universe,
    decls: &'a UnitDecls,
    info: &'a mut TypeInfo,
    scopes: ScopeStack,
    /// Package-level variables typed from their initializers
    inferred: BTreeMap<String, Type>,
    file: FileId,
}

impl<'a> BodyChecker<'a> {
    pub fn new(universe: &'a Universe, decls: &'a UnitDecls, info: &'a mut TypeInfo) -> Self {
        Self {
            universe,
            decls,
            info,
            scopes: ScopeStack::new(),
            inferred: BTreeMap::new(),
            file: 0,
        }
    }

    /// Check every initializer and body; returns the inferred types of
    /// package-level variables declared without a type
    pub fn check(mut self, files: &[SourceFile]) -> Result<BTreeMap<String, Type>, TypeError> {
        for (file_id, file) in files.iter().enumerate() {
            self.file = file_id;
            for decl in &file.declarations {
                if let DeclarationKind::Var(spec) | DeclarationKind::Const(spec) = &decl.kind {
                    let types = self.value_spec_types(spec)?;
                    if spec.ty.is_none() {
                        for (name, ty) in spec.names.iter().zip(types) {
                            if let (false, Some(ty)) = (name.is_blank(), ty) {
                                self.inferred.insert(name.name.clone(), ty);
                            }
                        }
                    }
                }
            }
        }

        for (file_id, file) in files.iter().enumerate() {
            self.file = file_id;
            for func in file.funcs() {
                let Some(body) = &func.body else { continue };
                self.scopes.enter_scope();
                if let Some(receiver) = &func.receiver {
                    let ty = self.resolve(&receiver.ty)?;
                    if let Some(name) = &receiver.name {
                        self.scopes.define(&name.name, Some(ty));
                    }
                }
                self.define_params(&func.sig)?;
                self.block(body)?;
                self.scopes.exit_scope();
            }
        }

        Ok(self.inferred)
    }

    fn resolve(&mut self, ty: &TypeExpr) -> Result<Type, TypeError> {
        Resolver::new(self.universe, self.decls, &mut *self.info).resolve(self.file, ty)
    }

    fn define_params(&mut self, sig: &FuncSig) -> Result<Signature, TypeError> {
        let resolved = Resolver::new(self.universe, self.decls, &mut *self.info).signature(self.file, sig)?;
        let params = sig.params.iter().zip(&resolved.params);
        let results = sig.results.iter().zip(&resolved.results);
        for (param, ty) in params.chain(results) {
            if let Some(name) = &param.name {
                self.scopes.define(&name.name, Some(ty.clone()));
            }
        }
        Ok(resolved)
    }

    // === Statements ===

    fn block(&mut self, block: &Block) -> Result<(), TypeError> {
        self.scopes.enter_scope();
        let result = self.statements(&block.statements);
        self.scopes.exit_scope();
        result
    }

    fn statements(&mut self, statements: &[Statement]) -> Result<(), TypeError> {
        for stmt in statements {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Statement) -> Result<(), TypeError> {
        match &stmt.kind {
            StatementKind::Block(block) => self.block(block)?,
            StatementKind::Expr(expr) | StatementKind::Go(expr) | StatementKind::Defer(expr) => {
                self.expr(expr)?;
            }
            StatementKind::Var(spec) => {
                let types = self.value_spec_types(spec)?;
                for (name, ty) in spec.names.iter().zip(types) {
                    self.scopes.define(&name.name, ty);
                }
            }
            StatementKind::Define { names, values } => {
                let types = self.assigned_types(names.len(), values)?;
                for (name, ty) in names.iter().zip(types) {
                    self.scopes.define(&name.name, ty);
                }
            }
            StatementKind::Assign { targets, values, .. } => {
                for expr in targets.iter().chain(values) {
                    self.expr(expr)?;
                }
            }
            StatementKind::IncDec { target, .. } => {
                self.expr(target)?;
            }
            StatementKind::Return(values) => {
                for value in values {
                    self.expr(value)?;
                }
            }
            StatementKind::If {
                init,
                cond,
                then,
                otherwise,
            } => {
                self.scopes.enter_scope();
                if let Some(init) = init {
                    self.statement(init)?;
                }
                self.expr(cond)?;
                self.block(then)?;
                if let Some(otherwise) = otherwise {
                    self.statement(otherwise)?;
                }
                self.scopes.exit_scope();
            }
            StatementKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.scopes.enter_scope();
                if let Some(init) = init {
                    self.statement(init)?;
                }
                if let Some(cond) = cond {
                    self.expr(cond)?;
                }
                if let Some(post) = post {
                    self.statement(post)?;
                }
                self.block(body)?;
                self.scopes.exit_scope();
            }
            StatementKind::Range {
                key,
                value,
                define,
                iterable,
                body,
            } => {
                self.scopes.enter_scope();
                let iterable_ty = self.expr(iterable)?.value();
                let (key_ty, value_ty) = iterable_ty
                    .map(|ty| self.range_types(&ty))
                    .unwrap_or((None, None));
                for (target, ty) in [(key, key_ty), (value, value_ty)] {
                    let Some(target) = target else { continue };
                    match (*define, target.as_ident()) {
                        (true, Some(name)) => {
                            if let Some(ty) = &ty {
                                self.info.record_expr(self.file, target.span, ty.clone());
                            }
                            self.scopes.define(name, ty);
                        }
                        _ => {
                            self.expr(target)?;
                        }
                    }
                }
                self.block(body)?;
                self.scopes.exit_scope();
            }
            StatementKind::Switch { init, tag, clauses } => {
                self.scopes.enter_scope();
                if let Some(init) = init {
                    self.statement(init)?;
                }
                if let Some(tag) = tag {
                    self.expr(tag)?;
                }
                for clause in clauses {
                    for expr in clause.exprs.iter().flatten() {
                        self.expr(expr)?;
                    }
                    self.scopes.enter_scope();
                    self.statements(&clause.body)?;
                    self.scopes.exit_scope();
                }
                self.scopes.exit_scope();
            }
            StatementKind::TypeSwitch(switch) => self.type_switch(switch)?,
            StatementKind::Branch(_) | StatementKind::Empty => {}
        }
        Ok(())
    }

    fn type_switch(&mut self, switch: &TypeSwitchStmt) -> Result<(), TypeError> {
        self.scopes.enter_scope();
        if let Some(init) = &switch.init {
            self.statement(init)?;
        }

        let (binding, subject) = match &switch.guard.kind {
            StatementKind::Define { names, values } if values.len() == 1 => {
                (names.first(), self.guard_subject(&values[0])?)
            }
            StatementKind::Assign { values, .. } if values.len() == 1 => {
                (None, self.guard_subject(&values[0])?)
            }
            StatementKind::Expr(expr) => (None, self.guard_subject(expr)?),
            _ => {
                self.statement(&switch.guard)?;
                (None, None)
            }
        };

        for clause in &switch.clauses {
            let mut case_types = Vec::new();
            for ty in clause.types.iter().flatten() {
                case_types.push(self.resolve(ty)?);
            }
            self.scopes.enter_scope();
            if let Some(binding) = binding {
                // A single-type clause binds that type; otherwise the subject's
                let ty = match case_types.as_slice() {
                    [single] if *single != Type::Nil => Some(single.clone()),
                    _ => subject.clone(),
                };
                self.scopes.define(&binding.name, ty);
            }
            self.statements(&clause.body)?;
            self.scopes.exit_scope();
        }

        self.scopes.exit_scope();
        Ok(())
    }

    /// Type of `x` in a `x.(type)` guard
    fn guard_subject(&mut self, guard: &Expr) -> Result<Option<Type>, TypeError> {
        match &guard.kind {
            ExprKind::TypeAssert { base, ty: None } => Ok(self.expr(base)?.value()),
            _ => Ok(self.expr(guard)?.value()),
        }
    }

    fn value_spec_types(&mut self, spec: &ValueSpec) -> Result<Vec<Option<Type>>, TypeError> {
        match &spec.ty {
            Some(ty) => {
                let declared = self.resolve(ty)?;
                for value in &spec.values {
                    self.expr_with_hint(value, Some(&declared))?;
                }
                Ok(vec![Some(declared); spec.names.len()])
            }
            None => self.assigned_types(spec.names.len(), &spec.values),
        }
    }

    /// Types given to `count` names by `values`: one value each, a tuple
    /// from a multi-result call, or a comma-ok form (`v, ok := m[k]`)
    fn assigned_types(&mut self, count: usize, values: &[Expr]) -> Result<Vec<Option<Type>>, TypeError> {
        if values.len() == count {
            let mut types = Vec::with_capacity(count);
            for value in values {
                types.push(self.expr(value)?.value());
            }
            return Ok(types);
        }

        let mut types = vec![None; count];
        if let [value] = values {
            match self.expr(value)?.value() {
                Some(Type::Tuple(results)) if results.len() == count => {
                    return Ok(results.into_iter().map(Some).collect());
                }
                Some(first) if count == 2 => {
                    types[0] = Some(first);
                    types[1] = Some(Type::Basic(BasicKind::Bool));
                }
                _ => {}
            }
        } else {
            for value in values {
                self.expr(value)?;
            }
        }
        Ok(types)
    }

    fn range_types(&self, iterable: &Type) -> (Option<Type>, Option<Type>) {
        let int = Type::Basic(BasicKind::Int);
        let underlying = match self.universe.underlying(iterable) {
            Type::Pointer(inner) => self.universe.underlying(inner),
            other => other,
        };
        match underlying {
            Type::Slice(elem) | Type::Array(elem) => (Some(int), Some(elem.as_ref().clone())),
            Type::Map(key, value) => (Some(key.as_ref().clone()), Some(value.as_ref().clone())),
            Type::Chan(elem) => (Some(elem.as_ref().clone()), None),
            Type::Basic(BasicKind::String) => (Some(int), Some(Type::Basic(BasicKind::Int32))),
            Type::Basic(_) => (Some(iterable.clone()), None),
            _ => (None, None),
        }
    }

    // === Expressions ===

    fn expr(&mut self, expr: &Expr) -> Result<Operand, TypeError> {
        self.expr_with_hint(expr, None)
    }

    /// Type an expression; `hint` is the element type for composite
    /// literals whose type is elided
    fn expr_with_hint(&mut self, expr: &Expr, hint: Option<&Type>) -> Result<Operand, TypeError> {
        let operand = self.operand(expr, hint)?;
        if let Operand::Value(ty) = &operand {
            self.info.record_expr(self.file, expr.span, ty.clone());
        }
        Ok(operand)
    }

    fn operand(&mut self, expr: &Expr, hint: Option<&Type>) -> Result<Operand, TypeError> {
        Ok(match &expr.kind {
            ExprKind::Literal(literal) => Operand::Value(Type::Basic(match literal {
                Literal::Int(_) => BasicKind::Int,
                Literal::Float(_) => BasicKind::Float64,
                Literal::String(_) => BasicKind::String,
                Literal::Rune(_) => BasicKind::Int32,
            })),
            ExprKind::Ident(name) => self.ident(name),
            ExprKind::Paren(inner) => self.expr_with_hint(inner, hint)?,
            ExprKind::Selector { base, field } => match self.expr(base)? {
                Operand::Package(path) => self.qualified(&path, &field.name),
                Operand::Value(ty) => match self.universe.lookup_field_or_method(&ty, &field.name) {
                    Some(Selection::Field(ty)) => Operand::Value(ty),
                    Some(Selection::Method(sig)) => Operand::Value(Type::Signature(sig)),
                    None => Operand::Unknown,
                },
                _ => Operand::Unknown,
            },
            ExprKind::Call { callee, args, .. } => {
                let callee = self.expr(callee)?;
                if let Operand::Builtin(builtin) = callee {
                    return self.builtin(builtin, args);
                }
                for arg in args {
                    self.expr(arg)?;
                }
                match callee {
                    // Conversion
                    Operand::TypeName(ty) => Operand::Value(ty),
                    Operand::Value(ty) => match self.universe.underlying(&ty) {
                        Type::Signature(sig) => sig.call_result().map_or(Operand::Unknown, Operand::Value),
                        _ => Operand::Unknown,
                    },
                    _ => Operand::Unknown,
                }
            }
            ExprKind::Index { base, index } => {
                let base = self.expr(base)?.value();
                self.expr(index)?;
                base.and_then(|ty| self.element_type(&ty))
                    .map_or(Operand::Unknown, Operand::Value)
            }
            ExprKind::SliceExpr {
                base,
                low,
                high,
                max,
            } => {
                let base = self.expr(base)?.value();
                for bound in [low, high, max].into_iter().flatten() {
                    self.expr(bound)?;
                }
                let Some(ty) = base else {
                    return Ok(Operand::Unknown);
                };
                let array_elem = match self.universe.underlying(&ty) {
                    Type::Array(elem) => Some(elem.clone()),
                    Type::Pointer(inner) => match self.universe.underlying(inner) {
                        Type::Array(elem) => Some(elem.clone()),
                        _ => return Ok(Operand::Unknown),
                    },
                    _ => None,
                };
                // Slicing an array yields a slice, anything else keeps its type
                Operand::Value(array_elem.map_or(ty, Type::Slice))
            }
            ExprKind::TypeAssert { base, ty } => {
                self.expr(base)?;
                match ty {
                    Some(ty) => Operand::Value(self.resolve(ty)?),
                    None => Operand::Unknown,
                }
            }
            ExprKind::Unary { op, operand } => {
                let inner = self.expr(operand)?;
                match (op, inner) {
                    (UnaryOp::Addr, Operand::Value(ty)) => Operand::Value(Type::pointer_to(ty)),
                    (UnaryOp::Deref, Operand::TypeName(ty)) => Operand::TypeName(Type::pointer_to(ty)),
                    (UnaryOp::Deref, Operand::Value(ty)) => match self.universe.underlying(&ty) {
                        Type::Pointer(inner) => Operand::Value(inner.as_ref().clone()),
                        _ => Operand::Unknown,
                    },
                    (UnaryOp::Not, _) => Operand::Value(Type::Basic(BasicKind::Bool)),
                    (UnaryOp::Recv, Operand::Value(ty)) => match self.universe.underlying(&ty) {
                        Type::Chan(elem) => Operand::Value(elem.as_ref().clone()),
                        _ => Operand::Unknown,
                    },
                    (UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot, value @ Operand::Value(_)) => value,
                    _ => Operand::Unknown,
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left)?.value();
                let right = self.expr(right)?.value();
                if op.is_comparison() || op.is_logical() {
                    Operand::Value(Type::Basic(BasicKind::Bool))
                } else if op.is_shift() {
                    left.map_or(Operand::Unknown, Operand::Value)
                } else {
                    left.or(right).map_or(Operand::Unknown, Operand::Value)
                }
            }
            ExprKind::Composite { ty, elements } => {
                let ty = match ty {
                    Some(ty) => Some(self.resolve(ty)?),
                    None => hint.cloned(),
                };
                self.composite_elements(ty.as_ref(), elements)?;
                ty.map_or(Operand::Unknown, Operand::Value)
            }
            ExprKind::FuncLit { sig, body } => {
                self.scopes.enter_scope();
                let resolved = self.define_params(sig);
                let checked = resolved.and_then(|sig| self.block(body).map(|_| sig));
                self.scopes.exit_scope();
                Operand::Value(Type::Signature(checked?))
            }
            ExprKind::Type(ty) => Operand::TypeName(self.resolve(ty)?),
        })
    }

    fn ident(&mut self, name: &str) -> Operand {
        if let Some(local) = self.scopes.lookup(name) {
            return local.cloned().map_or(Operand::Unknown, Operand::Value);
        }
        if let Some(package) = self.universe.package(&self.decls.path) {
            if let Some(ty) = package.lookup_type(name) {
                if let Type::Named(type_name) = &ty {
                    self.info.record_use(type_name);
                }
                return Operand::TypeName(ty);
            }
            if let Some(sig) = package.funcs.get(name) {
                return Operand::Value(Type::Signature(sig.clone()));
            }
            if let Some(ty) = package.vars.get(name).or_else(|| self.inferred.get(name)) {
                return Operand::Value(ty.clone());
            }
        }
        if self.decls.values.contains(name) {
            return Operand::Unknown;
        }
        if let Some(path) = self.decls.imports.get(self.file).and_then(|i| i.get(name)) {
            return Operand::Package(path.clone());
        }
        match name {
            "nil" => return Operand::Value(Type::Nil),
            "true" | "false" => return Operand::Value(Type::Basic(BasicKind::Bool)),
            "iota" => return Operand::Value(Type::Basic(BasicKind::Int)),
            _ => {}
        }
        if let Some(kind) = BasicKind::from_name(name) {
            return Operand::TypeName(Type::Basic(kind));
        }
        if let Some(ty) = self.universe.predeclared(name) {
            return Operand::TypeName(ty);
        }
        Builtin::from_name(name).map_or(Operand::Unknown, Operand::Builtin)
    }

    /// `pkg.Name` in expression position
    fn qualified(&mut self, path: &str, name: &str) -> Operand {
        let Some(package) = self.universe.package(path) else {
            return Operand::Unknown;
        };
        if let Some(ty) = package.lookup_type(name) {
            if let Type::Named(type_name) = &ty {
                self.info.record_use(type_name);
            }
            Operand::TypeName(ty)
        } else if let Some(sig) = package.funcs.get(name) {
            Operand::Value(Type::Signature(sig.clone()))
        } else if let Some(ty) = package.vars.get(name) {
            Operand::Value(ty.clone())
        } else {
            Operand::Unknown
        }
    }

    fn builtin(&mut self, builtin: Builtin, args: &[Expr]) -> Result<Operand, TypeError> {
        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            operands.push(self.expr(arg)?);
        }
        let first = operands.into_iter().next();
        Ok(match (builtin, first) {
            (Builtin::New, Some(Operand::TypeName(ty))) => Operand::Value(Type::pointer_to(ty)),
            (Builtin::Make, Some(Operand::TypeName(ty))) => Operand::Value(ty),
            (Builtin::Len | Builtin::Cap | Builtin::Copy, _) => Operand::Value(Type::Basic(BasicKind::Int)),
            (Builtin::Append | Builtin::Min | Builtin::Max, Some(value @ Operand::Value(_))) => value,
            (Builtin::Recover, _) => Operand::Value(Type::Interface(Interface::default())),
            _ => Operand::Unknown,
        })
    }

    /// Result of indexing a value of type `ty`
    fn element_type(&self, ty: &Type) -> Option<Type> {
        match self.universe.underlying(ty) {
            Type::Slice(elem) | Type::Array(elem) => Some(elem.as_ref().clone()),
            Type::Map(_, value) => Some(value.as_ref().clone()),
            Type::Basic(BasicKind::String) => Some(Type::Basic(BasicKind::Uint8)),
            Type::Pointer(inner) => match self.universe.underlying(inner) {
                Type::Array(elem) => Some(elem.as_ref().clone()),
                _ => None,
            },
            _ => None,
        }
    }

    fn composite_elements(&mut self, ty: Option<&Type>, elements: &[Element]) -> Result<(), TypeError> {
        // `[]*T{{...}}` elides `&T`
        let base = ty.map(|ty| match self.universe.underlying(ty) {
            Type::Pointer(inner) => self.universe.underlying(inner).clone(),
            other => other.clone(),
        });

        match base {
            Some(Type::Struct(fields)) => {
                for (position, element) in elements.iter().enumerate() {
                    let field = match element.key.as_ref().and_then(Expr::as_ident) {
                        Some(key) => fields.iter().find(|f| f.name == key),
                        None => fields.get(position),
                    };
                    self.expr_with_hint(&element.value, field.map(|f| &f.ty))?;
                }
            }
            Some(Type::Map(key_ty, value_ty)) => {
                for element in elements {
                    if let Some(key) = &element.key {
                        self.expr_with_hint(key, Some(key_ty.as_ref()))?;
                    }
                    self.expr_with_hint(&element.value, Some(value_ty.as_ref()))?;
                }
            }
            Some(Type::Slice(elem) | Type::Array(elem)) => {
                for element in elements {
                    if let Some(key) = &element.key {
                        self.expr(key)?;
                    }
                    self.expr_with_hint(&element.value, Some(elem.as_ref()))?;
                }
            }
            _ => {
                for element in elements {
                    if let Some(key) = &element.key {
                        self.expr(key)?;
                    }
                    self.expr(&element.value)?;
                }
            }
        }
        Ok(())
    }
}
