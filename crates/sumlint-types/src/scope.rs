//! Lexical scopes for function bodies

use std::collections::HashMap;

use crate::Type;

/// Local variables of a function body. A local shadows package-level
/// names even when its type is unknown, so bindings hold `Option<Type>`.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, Option<Type>>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a variable in the innermost scope; `_` is never bound
    pub fn define(&mut self, name: &str, ty: Option<Type>) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    /// Look up a variable, searching from the innermost scope outward.
    /// The outer `None` means the name is not a local.
    pub fn lookup(&self, name: &str) -> Option<Option<&Type>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(Option::as_ref)
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }
}
