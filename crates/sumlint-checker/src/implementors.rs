//! Implementor sets: computed for local sum interfaces, exported as facts,
//! and preloaded from the fact store for interfaces the unit refers to.

use std::collections::{BTreeMap, BTreeSet};

use sumlint_facts::{Fact, FactStore, InterfaceId, Result, VariantId};
use sumlint_types::{Type, TypeInfo, TypeName, Universe};
use tracing::debug;

use crate::discover::SumInterface;
use crate::identity::{interface_id, variant_id};

/// Known variants per interface, for one pass
pub type ImplementorSets = BTreeMap<InterfaceId, BTreeSet<VariantId>>;

/// Find the named non-interface types of `unit` implementing each sum
/// interface. `T` counts when either `T` or `*T` satisfies the interface;
/// both collapse to one variant. Every interface gets an entry, possibly
/// empty.
pub fn resolve_implementors(
    universe: &Universe,
    unit: &str,
    sums: &[SumInterface],
) -> ImplementorSets {
    let mut sets = ImplementorSets::new();
    let Some(package) = universe.package(unit) else {
        return sets;
    };

    for sum in sums {
        let declared = Type::Named(TypeName::new(unit, sum.id.name.clone()));
        let variants = sets.entry(sum.id.clone()).or_default();
        let Some(iface) = universe.interface_of(&declared) else {
            continue;
        };

        for named in package.types.values() {
            let candidate = Type::Named(named.name.clone());
            if universe.is_interface(&candidate) {
                continue;
            }
            if universe.implements(&candidate, iface)
                || universe.implements(&Type::pointer_to(candidate.clone()), iface)
            {
                variants.insert(variant_id(&named.name));
            }
        }
    }
    sets
}

/// Export a fact for every non-empty set. Returns the exported facts.
pub fn export_facts(store: &mut dyn FactStore, sets: &ImplementorSets) -> Result<Vec<Fact>> {
    let mut exported = Vec::new();
    for (interface, variants) in sets {
        if variants.is_empty() {
            continue;
        }
        for variant in variants {
            debug!(interface = %interface.name, name = %variant, "exporting implementation");
        }
        let fact = Fact::new(interface.clone(), variants.iter().cloned());
        store.export(&fact)?;
        exported.push(fact);
    }
    Ok(exported)
}

/// Import the facts of every interface type the unit declares or refers to
pub fn preload(
    universe: &Universe,
    unit: &str,
    info: &TypeInfo,
    store: &dyn FactStore,
) -> Result<ImplementorSets> {
    let declared = universe
        .package(unit)
        .into_iter()
        .flat_map(|package| package.types.values())
        .map(|named| &named.name);
    let candidates: BTreeSet<&TypeName> = declared
        .chain(info.uses())
        .filter(|name| universe.is_interface(&Type::Named((*name).clone())))
        .collect();

    let mut sets = ImplementorSets::new();
    for name in candidates {
        let id = interface_id(name);
        if let Some(fact) = store.import(&id)? {
            for variant in &fact.implementors {
                debug!(interface = %id, name = %variant, "loaded implementation");
            }
            sets.insert(id, fact.implementors);
        }
    }
    Ok(sets)
}
