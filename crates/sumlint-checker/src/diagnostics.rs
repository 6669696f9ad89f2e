//! Diagnostics reported on type switches

use std::fmt;

use sumlint_ast::Span;
use sumlint_facts::{InterfaceId, VariantId};
use sumlint_types::FileId;

/// Kind of diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Known variants the switch has no case for, in ascending order
    NonExhaustive { missing: Vec<VariantId> },
    /// No `default` arm, so a nil interface falls through
    MissingDefault,
}

/// A finding on one type switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The interface the switch dispatches on
    pub interface: InterfaceId,
    /// File of the switch, as an index into the unit's files
    pub file: FileId,
    /// Span of the `switch` keyword
    pub span: Span,
}

impl Diagnostic {
    pub fn non_exhaustive(
        interface: InterfaceId,
        missing: Vec<VariantId>,
        file: FileId,
        span: Span,
    ) -> Self {
        Self {
            kind: DiagnosticKind::NonExhaustive { missing },
            interface,
            file,
            span,
        }
    }

    pub fn missing_default(interface: InterfaceId, file: FileId, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::MissingDefault,
            interface,
            file,
            span,
        }
    }

    /// Stable code for the kind of finding
    pub fn code(&self) -> &'static str {
        match self.kind {
            DiagnosticKind::NonExhaustive { .. } => "S-SWITCH-001",
            DiagnosticKind::MissingDefault => "S-SWITCH-002",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Short label for the `switch` keyword in rendered reports
    pub fn label(&self) -> String {
        match &self.kind {
            DiagnosticKind::NonExhaustive { missing } => {
                format!("{} variant(s) of {} not handled", missing.len(), self.interface.name)
            }
            DiagnosticKind::MissingDefault => "no default case".to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::NonExhaustive { missing } => {
                let names: Vec<_> = missing.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "non-exhaustive type switch on {}: missing cases for: {}",
                    self.interface.name,
                    names.join(", ")
                )
            }
            DiagnosticKind::MissingDefault => write!(
                f,
                "missing default case on {}: code cannot handle nil interface",
                self.interface.name
            ),
        }
    }
}
