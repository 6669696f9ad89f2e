//! sumlint Facts - implementor sets shared between units
//!
//! A unit that declares a sum interface exports the set of its variants as
//! a fact; units analyzed later import it when they dispatch on that
//! interface. Two backends implement the `FactStore` trait:
//! - In-memory (one run, used by tests and by default)
//! - redb (persistent, so later runs can reuse facts of unchanged units)
//!
//! Every store is bound to the namespace of one analyzer, so facts written
//! by one analyzer are never visible to another.

mod error;
mod fact;
mod identity;
mod memory;
mod provider;
mod redb_store;

pub use error::{FactError, Result};
pub use fact::Fact;
pub use identity::{InterfaceId, VariantId};
pub use memory::InMemoryFactStore;
pub use provider::FactStore;
pub use redb_store::RedbFactStore;
