//! Type switch dispatch sites and their coverage.
//!
//! Every construct this module cannot interpret is skipped without a
//! diagnostic: guards other than a bare `x.(type)`, subjects the type
//! model could not type, subjects that are not interfaces, and interfaces
//! with no known implementor set.

use std::collections::BTreeSet;

use sumlint_ast::visit::{self, Visitor};
use sumlint_ast::{Expr, ExprKind, SourceFile, Span, Statement, StatementKind, TypeSwitchStmt};
use sumlint_facts::{InterfaceId, VariantId};
use sumlint_types::{FileId, Type, TypeInfo, Universe};

use crate::identity::{interface_id, type_name, variant_id};
use crate::implementors::ImplementorSets;

/// A type switch on an interface-typed value, before the interface is
/// mapped to an identity
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub file: FileId,
    /// Span of the `switch` keyword
    pub keyword: Span,
    /// Type of the switched value, with one pointer level stripped
    pub subject: Type,
    pub covered: BTreeSet<VariantId>,
    pub has_default: bool,
}

/// A type switch resolved to a sum interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSite {
    pub file: FileId,
    pub span: Span,
    pub interface: InterfaceId,
    pub covered: BTreeSet<VariantId>,
    pub has_default: bool,
}

impl DispatchSite {
    /// Known variants without a case, in ascending order
    pub fn missing(&self, known: &BTreeSet<VariantId>) -> Vec<VariantId> {
        known.difference(&self.covered).cloned().collect()
    }
}

struct Collector<'a> {
    universe: &'a Universe,
    info: &'a TypeInfo,
    file: FileId,
    out: Vec<Candidate>,
}

impl Visitor for Collector<'_> {
    fn visit_type_switch(&mut self, switch: &TypeSwitchStmt) {
        if let Some(candidate) = self.candidate(switch) {
            self.out.push(candidate);
        }
        visit::walk_type_switch(self, switch);
    }
}

impl Collector<'_> {
    fn candidate(&self, switch: &TypeSwitchStmt) -> Option<Candidate> {
        let operand = guard_operand(&switch.guard)?;
        let subject = self.info.type_of(self.file, operand)?.deref().clone();
        if !self.universe.is_interface(&subject) {
            return None;
        }

        let mut covered = BTreeSet::new();
        let mut has_default = false;
        for clause in &switch.clauses {
            let Some(types) = &clause.types else {
                has_default = true;
                continue;
            };
            for ty in types {
                let named = self
                    .info
                    .type_of_type_expr(self.file, ty)
                    .and_then(|t| t.deref().as_named());
                if let Some(name) = named {
                    covered.insert(variant_id(name));
                }
            }
        }

        Some(Candidate {
            file: self.file,
            keyword: switch.keyword,
            subject,
            covered,
            has_default,
        })
    }
}

/// `x` in a guard of the form `x.(type)` or `v := x.(type)`
fn guard_operand(guard: &Statement) -> Option<&Expr> {
    let assert = match &guard.kind {
        StatementKind::Expr(expr) => expr,
        StatementKind::Define { values, .. } | StatementKind::Assign { values, .. } => {
            match values.as_slice() {
                [value] => value,
                _ => return None,
            }
        }
        _ => return None,
    };
    match &assert.kind {
        ExprKind::TypeAssert { base, ty: None } => Some(base),
        _ => None,
    }
}

/// Applicable type switches of one file, in source order
pub(crate) fn candidates(
    universe: &Universe,
    info: &TypeInfo,
    file: FileId,
    source: &SourceFile,
) -> Vec<Candidate> {
    let mut collector = Collector {
        universe,
        info,
        file,
        out: Vec::new(),
    };
    visit::walk_file(&mut collector, source);
    collector.out
}

/// Identity of the interface a switch dispatches on. A named subject is
/// its own identity; an unnamed interface resolves only when exactly one
/// known interface has the identical shape.
pub(crate) fn resolve_interface(
    universe: &Universe,
    subject: &Type,
    known: &ImplementorSets,
) -> Option<InterfaceId> {
    if let Type::Named(name) = subject {
        return Some(interface_id(name));
    }
    let shape = universe.underlying(subject);
    let mut matches = known.keys().filter(|id| {
        let declared = Type::Named(type_name(id));
        universe.identical(universe.underlying(&declared), shape)
    });
    match (matches.next(), matches.next()) {
        (Some(id), None) => Some(id.clone()),
        _ => None,
    }
}
