//! sumlint Checker - exhaustiveness of type switches over sum interfaces
//!
//! A sum interface is a closed set of variants, marked by convention: an
//! interface whose only method is a no-argument marker named after the
//! interface (`SumFoo` with `sumFoo()`). For one unit, a pass
//! 1. discovers the sum interfaces it declares,
//! 2. computes their implementors and exports them as facts,
//! 3. checks every type switch on a sum interface, local or imported,
//!    for a case per variant and a `default` arm.

mod config;
mod diagnostics;
mod discover;
mod identity;
mod implementors;
mod pass;
mod switch;

pub use config::AnalyzerConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use discover::{discover, SumInterface};
pub use identity::lower_first;
pub use implementors::{export_facts, preload, resolve_implementors, ImplementorSets};
pub use pass::Pass;
pub use switch::DispatchSite;

use sumlint_ast::SourceFile;
use sumlint_facts::{Fact, FactError, FactStore};
use sumlint_types::{TypeInfo, Universe};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("fact store error: {0}")]
    Facts(#[from] FactError),

    #[error("unit {0} has not been type-checked")]
    UnknownUnit(String),

    #[error("analyzer {analyzer} cannot use facts of namespace {namespace}")]
    NamespaceMismatch { analyzer: String, namespace: String },
}

/// Result of analyzing one unit
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// Sum interfaces declared in the unit
    pub interfaces: Vec<SumInterface>,
    /// Facts this unit exported
    pub exported: Vec<Fact>,
    /// Type switches resolved to a sum interface with known variants
    pub sites: Vec<DispatchSite>,
    /// Findings in source order, per file
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Analyze a type-checked unit, exporting its facts to `store` and
/// checking its type switches against everything the store knows.
pub fn analyze(
    config: &AnalyzerConfig,
    universe: &Universe,
    unit: &str,
    files: &[SourceFile],
    info: &TypeInfo,
    store: &mut dyn FactStore,
) -> Result<AnalysisResult, CheckError> {
    Pass::new(config, universe, unit, files, info, store).run()
}
