//! Read-only traversal of function bodies
//!
//! `Visitor` methods default to walking their children, so an implementor
//! overrides only the nodes it cares about and calls the matching `walk_*`
//! function to keep descending.

use crate::*;

pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_type_switch(&mut self, switch: &TypeSwitchStmt) {
        walk_type_switch(self, switch);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// Visit every function and method body of a file in declaration order,
/// including initializers of package-level variables.
pub fn walk_file<V: Visitor + ?Sized>(visitor: &mut V, file: &SourceFile) {
    for decl in &file.declarations {
        match &decl.kind {
            DeclarationKind::Func(func) => {
                if let Some(body) = &func.body {
                    visitor.visit_block(body);
                }
            }
            DeclarationKind::Var(spec) | DeclarationKind::Const(spec) => {
                for value in &spec.values {
                    visitor.visit_expr(value);
                }
            }
            DeclarationKind::Type(_) => {}
        }
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for stmt in &block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Statement) {
    match &stmt.kind {
        StatementKind::Block(block) => visitor.visit_block(block),
        StatementKind::Expr(expr) | StatementKind::Go(expr) | StatementKind::Defer(expr) => {
            visitor.visit_expr(expr)
        }
        StatementKind::Var(spec) => {
            for value in &spec.values {
                visitor.visit_expr(value);
            }
        }
        StatementKind::Define { values, .. } => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        StatementKind::Assign { targets, values, .. } => {
            for expr in targets.iter().chain(values) {
                visitor.visit_expr(expr);
            }
        }
        StatementKind::IncDec { target, .. } => visitor.visit_expr(target),
        StatementKind::Return(values) => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        StatementKind::If { init, cond, then, otherwise } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            visitor.visit_expr(cond);
            visitor.visit_block(then);
            if let Some(otherwise) = otherwise {
                visitor.visit_statement(otherwise);
            }
        }
        StatementKind::For { init, cond, post, body } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            if let Some(post) = post {
                visitor.visit_statement(post);
            }
            visitor.visit_block(body);
        }
        StatementKind::Range { key, value, iterable, body, .. } => {
            for expr in key.iter().chain(value) {
                visitor.visit_expr(expr);
            }
            visitor.visit_expr(iterable);
            visitor.visit_block(body);
        }
        StatementKind::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            if let Some(tag) = tag {
                visitor.visit_expr(tag);
            }
            for clause in clauses {
                for expr in clause.exprs.iter().flatten() {
                    visitor.visit_expr(expr);
                }
                for stmt in &clause.body {
                    visitor.visit_statement(stmt);
                }
            }
        }
        StatementKind::TypeSwitch(switch) => visitor.visit_type_switch(switch),
        StatementKind::Branch(_) | StatementKind::Empty => {}
    }
}

pub fn walk_type_switch<V: Visitor + ?Sized>(visitor: &mut V, switch: &TypeSwitchStmt) {
    if let Some(init) = &switch.init {
        visitor.visit_statement(init);
    }
    visitor.visit_statement(&switch.guard);
    for clause in &switch.clauses {
        for stmt in &clause.body {
            visitor.visit_statement(stmt);
        }
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::Type(_) => {}
        ExprKind::Paren(inner) => visitor.visit_expr(inner),
        ExprKind::Selector { base, .. } => visitor.visit_expr(base),
        ExprKind::Call { callee, args, .. } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Index { base, index } => {
            visitor.visit_expr(base);
            visitor.visit_expr(index);
        }
        ExprKind::SliceExpr { base, low, high, max } => {
            visitor.visit_expr(base);
            for bound in [low, high, max].into_iter().flatten() {
                visitor.visit_expr(bound);
            }
        }
        ExprKind::TypeAssert { base, .. } => visitor.visit_expr(base),
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Composite { elements, .. } => {
            for element in elements {
                if let Some(key) = &element.key {
                    visitor.visit_expr(key);
                }
                visitor.visit_expr(&element.value);
            }
        }
        ExprKind::FuncLit { body, .. } => visitor.visit_block(body),
    }
}
