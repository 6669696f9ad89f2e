//! The fact exported for a sum interface

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{InterfaceId, VariantId};

/// The known variants of one sum interface, in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub interface: InterfaceId,
    pub implementors: BTreeSet<VariantId>,
}

impl Fact {
    pub fn new(interface: InterfaceId, implementors: impl IntoIterator<Item = VariantId>) -> Self {
        Self {
            interface,
            implementors: implementors.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.implementors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.implementors.len()
    }

    pub fn contains(&self, variant: &VariantId) -> bool {
        self.implementors.contains(variant)
    }
}

/// Comma-joined implementor list, e.g. `dflt.A,dflt.B`
impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, variant) in self.implementors.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", variant)?;
        }
        Ok(())
    }
}
