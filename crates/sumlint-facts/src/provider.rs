//! Fact store trait

use crate::{Fact, InterfaceId, Result};

/// Pluggable fact store interface
///
/// A store holds the facts of one analyzer namespace. Facts written by a
/// unit become visible to every unit analyzed after it; the driver
/// guarantees producers run before their consumers.
pub trait FactStore: Send + Sync {
    /// Namespace of the analyzer this store belongs to
    fn namespace(&self) -> &str;

    /// Store the fact for its interface, replacing any earlier one
    fn export(&mut self, fact: &Fact) -> Result<()>;

    /// Drop every fact of the namespace whose interface is declared in
    /// `unit`, returning how many were removed. A unit retracts its facts
    /// before exporting, so sets it no longer produces do not outlive it.
    fn retract_unit(&mut self, unit: &str) -> Result<usize>;

    /// The fact exported for `interface`, if any unit exported one
    fn import(&self, interface: &InterfaceId) -> Result<Option<Fact>>;

    /// Every fact in the namespace, ordered by interface identity
    fn facts(&self) -> Result<Vec<Fact>>;
}
