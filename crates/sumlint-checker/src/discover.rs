//! Sum interface discovery
//!
//! A declaration is a sum interface when its name carries the analyzer's
//! prefix and it is an interface with exactly one method, the marker,
//! named after the interface with a lower-case first letter and taking
//! no parameters and returning nothing. Anything else is silently ignored.

use sumlint_ast::{SourceFile, Span, TypeSpec};
use sumlint_facts::InterfaceId;
use sumlint_types::{Type, TypeName, Universe};
use tracing::trace;

use crate::identity::lower_first;
use crate::AnalyzerConfig;

/// A validated sum interface declared in the unit under analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumInterface {
    pub id: InterfaceId,
    /// Name of the marker method
    pub method: String,
    /// Span of the declared name
    pub span: Span,
}

impl SumInterface {
    /// Validate one top-level type declaration of `unit`. The unit must
    /// already be type-checked into `universe`.
    pub fn from_decl(
        config: &AnalyzerConfig,
        universe: &Universe,
        unit: &str,
        spec: &TypeSpec,
    ) -> Option<Self> {
        let name = &spec.name.name;
        if spec.is_alias || !name.starts_with(config.prefix.as_str()) {
            return None;
        }

        let declared = Type::Named(TypeName::new(unit, name.clone()));
        let iface = universe.interface_of(&declared)?;
        if !iface.embeddeds.is_empty() {
            trace!(interface = %name, "rejected: embeds interfaces");
            return None;
        }
        let [method] = iface.methods.as_slice() else {
            trace!(interface = %name, methods = iface.methods.len(), "rejected: not a single method");
            return None;
        };
        if method.name != lower_first(name) {
            trace!(interface = %name, method = %method.name, "rejected: marker name");
            return None;
        }
        if !method.sig.params.is_empty() || !method.sig.results.is_empty() {
            trace!(interface = %name, "rejected: marker signature");
            return None;
        }

        Some(Self {
            id: InterfaceId::new(unit, name.clone()),
            method: method.name.clone(),
            span: spec.name.span,
        })
    }
}

/// Every sum interface declared in the unit, in declaration order
pub fn discover(
    config: &AnalyzerConfig,
    universe: &Universe,
    unit: &str,
    files: &[SourceFile],
) -> Vec<SumInterface> {
    files
        .iter()
        .flat_map(SourceFile::type_specs)
        .filter_map(|spec| SumInterface::from_decl(config, universe, unit, spec))
        .collect()
}
