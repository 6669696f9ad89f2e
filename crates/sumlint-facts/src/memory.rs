//! In-memory fact store

use std::collections::BTreeMap;

use tracing::trace;

use crate::{Fact, FactStore, InterfaceId, Result};

/// In-memory fact store
///
/// Lives for a single run; all facts are lost when it is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryFactStore {
    namespace: String,
    facts: BTreeMap<InterfaceId, Fact>,
}

impl InMemoryFactStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            facts: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FactStore for InMemoryFactStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn export(&mut self, fact: &Fact) -> Result<()> {
        trace!(namespace = %self.namespace, interface = %fact.interface, "export fact");
        self.facts.insert(fact.interface.clone(), fact.clone());
        Ok(())
    }

    fn retract_unit(&mut self, unit: &str) -> Result<usize> {
        let before = self.facts.len();
        self.facts.retain(|interface, _| interface.unit != unit);
        Ok(before - self.facts.len())
    }

    fn import(&self, interface: &InterfaceId) -> Result<Option<Fact>> {
        Ok(self.facts.get(interface).cloned())
    }

    fn facts(&self) -> Result<Vec<Fact>> {
        Ok(self.facts.values().cloned().collect())
    }
}
