//! Conversions between type-model names and fact identities

use sumlint_facts::{InterfaceId, VariantId};
use sumlint_types::TypeName;

/// `SumFoo` -> `sumFoo`; `isMsg_Payload` is unchanged
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn interface_id(name: &TypeName) -> InterfaceId {
    InterfaceId::new(name.package.clone(), name.name.clone())
}

pub fn variant_id(name: &TypeName) -> VariantId {
    VariantId::new(name.package.clone(), name.name.clone())
}

pub fn type_name(id: &InterfaceId) -> TypeName {
    TypeName::new(id.unit.clone(), id.name.clone())
}
