//! Stable identities of interfaces and their variants
//!
//! Both are a (unit path, declared name) pair. They render as
//! `<unit path>.<Name>`, or just `<Name>` when the unit path is empty, and
//! they order by that rendering so sorted sets print in ascending order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

macro_rules! qualified_identity {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            /// Path of the unit that declares the type
            pub unit: String,
            pub name: String,
        }

        impl $name {
            pub fn new(unit: impl Into<String>, name: impl Into<String>) -> Self {
                Self {
                    unit: unit.into(),
                    name: name.into(),
                }
            }

            fn rendered(&self) -> impl Iterator<Item = u8> + '_ {
                let dot: &[u8] = if self.unit.is_empty() { b"" } else { b"." };
                self.unit
                    .bytes()
                    .chain(dot.iter().copied())
                    .chain(self.name.bytes())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.unit.is_empty() {
                    write!(f, "{}", self.name)
                } else {
                    write!(f, "{}.{}", self.unit, self.name)
                }
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.rendered().cmp(other.rendered())
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
    };
}

qualified_identity! {
    /// Identity of a sum interface. Two declarations are the same sum type
    /// exactly when their identities are equal.
    InterfaceId
}

qualified_identity! {
    /// Identity of a variant. `T` and `*T` share one identity.
    VariantId
}
