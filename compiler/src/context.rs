use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::CodecGenError,
    expand::expand,
    policy::VariantPolicy,
    types::{Property, Scalar, SchemaInterface, SchemaSet, Type},
    utils::{field_name, rust_str, to_snake_case},
};

/// How a property is held in the generated struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Non-nullable number or boolean.
    Plain,
    /// `Option<T>`: nullable numbers and booleans, strings, enums, `Any`.
    Optional,
    /// `Option<Box<T>>`: references to other DTOs.
    Boxed,
    /// `Option<C>`: List and Map, materialized by `ensure_x`.
    Container,
}

pub fn storage(property: &Property) -> Storage {
    match &property.ty {
        Type::Scalar(Scalar::Number(_)) | Type::Scalar(Scalar::Boolean) if !property.nullable => Storage::Plain,
        Type::Reference(_) => Storage::Boxed,
        Type::List(_) | Type::Map(_) => Storage::Container,
        _ => Storage::Optional,
    }
}

/// Everything the emitters need to name Rust types for one variant.
pub struct GenContext<'a> {
    pub schema:    &'a SchemaSet,
    pub policy:    &'a dyn VariantPolicy,
    pub overrides: &'a BTreeMap<String, String>,
    /// Interfaces left out of the module; references to them cannot resolve.
    pub failed:    BTreeSet<String>,
}

impl<'a> GenContext<'a> {
    pub fn new(schema: &'a SchemaSet, policy: &'a dyn VariantPolicy, overrides: &'a BTreeMap<String, String>) -> Self {
        GenContext { schema, policy, overrides, failed: BTreeSet::new() }
    }

    /// Marks every interface that cannot be generated, including those that
    /// only reach a failing interface through their properties.
    pub fn exclude_failing(&mut self) {
        loop {
            let failing: Vec<String> = self
                .schema
                .interfaces
                .iter()
                .filter(|iface| !self.is_external(&iface.name) && !self.failed.contains(&iface.name))
                .filter(|iface| self.check_interface(iface).is_err())
                .map(|iface| iface.name.clone())
                .collect();
            if failing.is_empty() {
                return;
            }
            self.failed.extend(failing);
        }
    }

    /// Rust path implementing `interface`: the override if there is one,
    /// otherwise the local `{Name}Impl` unless it failed.
    pub fn reference_path(&self, interface: &str) -> Option<String> {
        match self.overrides.get(interface) {
            Some(path) => Some(path.clone()),
            None if self.failed.contains(interface) => None,
            None if self.schema.interface(interface).is_some() => Some(impl_name(interface)),
            None => None,
        }
    }

    pub fn is_external(&self, interface: &str) -> bool {
        self.overrides.contains_key(interface)
    }

    /// Fails if some property of `iface` refers to an interface that is
    /// neither generated here nor overridden.
    pub fn check_interface(&self, iface: &SchemaInterface) -> Result<(), CodecGenError> {
        for property in self.schema.all_properties(iface) {
            if let Type::Reference(name) = expand(&property.ty).terminal() {
                if self.reference_path(name).is_none() {
                    return Err(CodecGenError::UnsupportedType {
                        interface: iface.name.clone(),
                        property:  property.name.clone(),
                        type_name: property.ty.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rust type of a value of `ty`, as held inside a container.
    pub fn rust_type(&self, ty: &Type) -> String {
        match ty {
            Type::Scalar(Scalar::String)       => "String".to_string(),
            Type::Scalar(Scalar::Boolean)      => "bool".to_string(),
            Type::Scalar(Scalar::Number(kind)) => kind.rust_type().to_string(),
            Type::Enum(name) => name.clone(),
            Type::Reference(name) => self.reference_path(name).unwrap_or_else(|| impl_name(name)),
            Type::List(inner) => self.policy.list_type(&self.rust_type(inner)),
            Type::Map(inner)  => self.policy.map_type(&self.rust_type(inner)),
            Type::Any => "dtogen_runtime::Value".to_string(),
        }
    }

    /// Rust type of the struct field holding `property`.
    pub fn storage_type(&self, property: &Property) -> String {
        let inner = self.rust_type(&property.ty);
        match storage(property) {
            Storage::Plain => inner,
            Storage::Boxed => format!("Option<Box<{}>>", inner),
            Storage::Optional | Storage::Container => format!("Option<{}>", inner),
        }
    }
}

pub fn impl_name(interface: &str) -> String {
    format!("{}Impl", interface)
}

/// Suffix of the accessor names of `property`, e.g. `get_{suffix}`.
pub fn accessor_suffix(property: &Property) -> String {
    to_snake_case(&property.name)
}

pub fn field(property: &Property) -> String {
    field_name(&property.name)
}

/// Rust literal naming a property in decode errors.
pub fn property_path(iface: &SchemaInterface, property: &Property) -> String {
    rust_str(&format!("{}.{}", iface.name, property.name))
}

/// Whether encoding or decoding `property` reads the `copy_jsons` flag.
pub fn uses_copy_jsons(property: &Property) -> bool {
    matches!(expand(&property.ty).terminal(), Type::Any | Type::Reference(_))
}
