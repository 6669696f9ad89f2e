//! One analyzer pass over one unit

use sumlint_ast::SourceFile;
use sumlint_facts::{FactStore, InterfaceId, VariantId};
use sumlint_types::{TypeInfo, Universe};
use std::collections::BTreeSet;
use tracing::{debug, info_span};

use crate::discover::discover;
use crate::implementors::{export_facts, preload, resolve_implementors, ImplementorSets};
use crate::switch::{candidates, resolve_interface, DispatchSite};
use crate::{AnalysisResult, AnalyzerConfig, CheckError, Diagnostic};

/// State private to the analysis of one unit. The fact store is the only
/// thing shared with other passes.
pub struct Pass<'a> {
    config: &'a AnalyzerConfig,
    universe: &'a Universe,
    unit: &'a str,
    files: &'a [SourceFile],
    info: &'a TypeInfo,
    store: &'a mut dyn FactStore,
    sets: ImplementorSets,
}

impl<'a> Pass<'a> {
    pub fn new(
        config: &'a AnalyzerConfig,
        universe: &'a Universe,
        unit: &'a str,
        files: &'a [SourceFile],
        info: &'a TypeInfo,
        store: &'a mut dyn FactStore,
    ) -> Self {
        Self {
            config,
            universe,
            unit,
            files,
            info,
            store,
            sets: ImplementorSets::new(),
        }
    }

    pub fn run(mut self) -> Result<AnalysisResult, CheckError> {
        if self.store.namespace() != self.config.name {
            return Err(CheckError::NamespaceMismatch {
                analyzer: self.config.name.clone(),
                namespace: self.store.namespace().to_string(),
            });
        }
        if self.universe.package(self.unit).is_none() {
            return Err(CheckError::UnknownUnit(self.unit.to_string()));
        }

        let (universe, unit, files, info) = (self.universe, self.unit, self.files, self.info);
        let span = info_span!("analyzer", name = %self.config.name, unit = %unit);
        let _guard = span.enter();

        // Facts from an earlier run of this unit are replaced, not merged
        let retracted = self.store.retract_unit(unit)?;
        if retracted > 0 {
            debug!(count = retracted, "retracted earlier facts");
        }

        let interfaces = discover(self.config, universe, unit, files);
        let mut exported = Vec::new();
        if !interfaces.is_empty() {
            debug!(count = interfaces.len(), "discovered interfaces");
            let local = resolve_implementors(universe, unit, &interfaces);
            exported = export_facts(&mut *self.store, &local)?;
        }

        self.sets = preload(universe, unit, info, &*self.store)?;
        if self.config.verbose {
            let count: usize = self.sets.values().map(BTreeSet::len).sum();
            if count > 0 {
                debug!(count, "discovered implementations");
            }
        }

        let mut sites = Vec::new();
        let mut diagnostics = Vec::new();
        for (file_id, file) in files.iter().enumerate() {
            for candidate in candidates(universe, info, file_id, file) {
                let Some(interface) = resolve_interface(universe, &candidate.subject, &self.sets)
                else {
                    continue;
                };
                let Some(known) = self.known_variants(&interface)? else {
                    continue;
                };

                let site = DispatchSite {
                    file: file_id,
                    span: candidate.keyword,
                    interface,
                    covered: candidate.covered,
                    has_default: candidate.has_default,
                };
                let missing = site.missing(&known);
                if !missing.is_empty() {
                    diagnostics.push(Diagnostic::non_exhaustive(
                        site.interface.clone(),
                        missing,
                        site.file,
                        site.span,
                    ));
                }
                if !site.has_default {
                    diagnostics.push(Diagnostic::missing_default(
                        site.interface.clone(),
                        site.file,
                        site.span,
                    ));
                }
                sites.push(site);
            }
        }

        debug!(sites = sites.len(), diagnostics = diagnostics.len(), "checked type switches");
        Ok(AnalysisResult {
            interfaces,
            exported,
            sites,
            diagnostics,
        })
    }

    /// The implementor set of `interface`: from this pass when non-empty,
    /// otherwise imported now and kept for the rest of the pass
    fn known_variants(
        &mut self,
        interface: &InterfaceId,
    ) -> Result<Option<BTreeSet<VariantId>>, CheckError> {
        if let Some(known) = self.sets.get(interface).filter(|set| !set.is_empty()) {
            return Ok(Some(known.clone()));
        }
        let Some(fact) = self.store.import(interface)? else {
            return Ok(None);
        };
        if fact.is_empty() {
            return Ok(None);
        }
        debug!(interface = %interface, count = fact.len(), "imported facts at dispatch site");
        self.sets.insert(interface.clone(), fact.implementors.clone());
        Ok(Some(fact.implementors))
    }
}
