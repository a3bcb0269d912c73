use std::collections::{HashMap, HashSet};

use crate::{
    error::SchemaError,
    types::{SchemaInterface, SchemaSet},
    utils::field_name,
};

/// Checks the invariants that span several definitions: acyclic inheritance,
/// unique wire and field names over inherited properties, and complete,
/// unique serialization indices on compact interfaces.
pub fn verify_schema(set: &SchemaSet) -> Result<(), SchemaError> {
    // 1) Check that no interface inherits from itself
    let mut state: HashMap<&str, u8> = HashMap::new();
    fn check_inheritance<'a>(
        iface: &'a SchemaInterface,
        set: &'a SchemaSet,
        state: &mut HashMap<&'a str, u8>,
    ) -> Result<(), SchemaError> {
        match state.get(iface.name.as_str()) {
            Some(1) => return Err(SchemaError::CyclicInheritance(iface.name.clone())),
            Some(_) => return Ok(()),
            None => {}
        }
        state.insert(&iface.name, 1);
        if let Some(parent) = iface.parent.as_deref().and_then(|name| set.interface(name)) {
            check_inheritance(parent, set, state)?;
        }
        state.insert(&iface.name, 2);
        Ok(())
    }

    for iface in &set.interfaces {
        check_inheritance(iface, set, &mut state)?;
    }

    for iface in &set.interfaces {
        let all = set.all_properties(iface);

        // 2) Check that inherited and own properties stay distinguishable
        let mut fields = HashSet::new();
        let mut wire_names = HashSet::new();
        for property in &all {
            let clashes = !fields.insert(field_name(&property.name))
                || (!iface.compact && !wire_names.insert(property.wire_name()));
            if clashes {
                return Err(SchemaError::DuplicateProperty {
                    interface: iface.name.clone(),
                    property:  property.name.clone(),
                });
            }
        }

        // 3) Check serialization indices of compact interfaces
        if iface.compact {
            let mut indices = HashSet::new();
            for property in &all {
                let index = property.index.ok_or_else(|| SchemaError::MissingIndex {
                    interface: iface.name.clone(),
                    property:  property.name.clone(),
                })?;
                if !indices.insert(index) {
                    return Err(SchemaError::DuplicateIndex {
                        interface: iface.name.clone(),
                        property:  property.name.clone(),
                        index,
                    });
                }
            }
        }
    }

    Ok(())
}
