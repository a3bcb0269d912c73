//! Schema descriptors and their validation into a [`SchemaSet`].
//!
//! A descriptor document looks like:
//!
//! ```json
//! {
//!   "package": "model",
//!   "enums": [{ "name": "Role", "constants": ["ADMIN", "GUEST"] }],
//!   "interfaces": [{
//!     "name": "User",
//!     "extends": "Entity",
//!     "compact": false,
//!     "properties": [{ "name": "tags", "type": "List<string>", "wireName": "t" }],
//!     "delegations": [{ "method": "label", "target": "crate::support::label",
//!                       "params": [{ "name": "sep", "type": "&str" }], "returns": "String" }]
//!   }]
//! }
//! ```

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{DtoGenError, SchemaError},
    parser::{parse_type_expr, TypeExpr},
    types::{DelegateParam, Delegation, EnumDef, NumberKind, Property, Scalar, SchemaInterface, SchemaSet, Type},
    utils::{escape_rust_keyword, to_pascal_case},
    verifier::verify_schema,
};

lazy_static! {
    pub static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    pub static ref RUST_PATH:  Regex = Regex::new(r"^(::)?[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
}

/// Names that cannot be used for enums or interfaces.
pub const RESERVED_NAMES: [&str; 11] = [
    "List", "Map", "string", "boolean", "any", "int", "long", "short", "byte", "float", "double",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSource {
    #[serde(default)]
    pub package:    Option<String>,
    #[serde(default)]
    pub enums:      Vec<EnumSource>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSource>,
    /// Interfaces implemented outside the schema, referenced by name.
    #[serde(default)]
    pub externals:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSource {
    pub name:      String,
    pub constants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSource {
    pub name:        String,
    #[serde(default)]
    pub extends:     Option<String>,
    #[serde(default)]
    pub compact:     bool,
    #[serde(default)]
    pub properties:  Vec<PropertySource>,
    #[serde(default)]
    pub delegations: Vec<DelegationSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySource {
    pub name:      String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub wire_name: Option<String>,
    #[serde(default)]
    pub index:     Option<i64>,
    #[serde(default)]
    pub nullable:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationSource {
    pub method:  String,
    pub target:  String,
    #[serde(default)]
    pub params:  Vec<ParamSource>,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSource {
    pub name: String,
    #[serde(rename = "type")]
    pub ty:   String,
}

/// Parses a descriptor document.
pub fn parse_schema_source(text: &str) -> Result<SchemaSource, DtoGenError> {
    Ok(serde_json::from_str(text)?)
}

/// Validates `source` and builds the schema set.
pub fn load_interfaces(source: &SchemaSource) -> Result<SchemaSet, SchemaError> {
    if let Some(package) = &source.package {
        check_identifier("package", package)?;
    }
    let names = declared_names(source)?;

    let enums = source
        .enums
        .iter()
        .map(|def| {
            let mut variants = HashSet::new();
            for constant in &def.constants {
                check_identifier("enum constant", constant)?;
                if !variants.insert(escape_rust_keyword(&to_pascal_case(constant))) {
                    return Err(SchemaError::DuplicateConstant {
                        enum_name: def.name.clone(),
                        constant:  constant.clone(),
                    });
                }
            }
            Ok(EnumDef {
                name:      def.name.clone(),
                constants: def.constants.clone(),
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    let interfaces = source
        .interfaces
        .iter()
        .map(|iface| load_interface(iface, &names))
        .collect::<Result<Vec<_>, SchemaError>>()?;

    let set = SchemaSet {
        package: source.package.clone(),
        enums,
        interfaces,
        externals: source.externals.clone(),
    };
    verify_schema(&set)?;

    debug!(
        interfaces = set.interfaces.len(),
        enums = set.enums.len(),
        "loaded schema"
    );
    Ok(set)
}

/// Names a type expression may refer to.
#[derive(Debug, Default)]
pub struct DeclaredNames {
    enums:      HashSet<String>,
    interfaces: HashSet<String>,
    /// Subset of `interfaces` declared without a definition.
    externals:  HashSet<String>,
}

impl DeclaredNames {
    pub fn of_schema(set: &SchemaSet) -> Self {
        DeclaredNames {
            enums:      set.enums.iter().map(|def| def.name.clone()).collect(),
            interfaces: set
                .interfaces
                .iter()
                .map(|iface| iface.name.clone())
                .chain(set.externals.iter().cloned())
                .collect(),
            externals:  set.externals.iter().cloned().collect(),
        }
    }
}

fn declared_names(source: &SchemaSource) -> Result<DeclaredNames, SchemaError> {
    let mut names = DeclaredNames::default();
    let mut seen = HashSet::new();

    let declared = source
        .enums
        .iter()
        .map(|def| (&def.name, true))
        .chain(source.interfaces.iter().map(|iface| (&iface.name, false)))
        .chain(source.externals.iter().map(|name| (name, false)));
    names.externals = source.externals.iter().cloned().collect();

    for (name, is_enum) in declared {
        check_identifier("type", name)?;
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(SchemaError::InvalidIdentifier { kind: "reserved type", name: name.clone() });
        }
        if !seen.insert(name.clone()) {
            return Err(SchemaError::DuplicateDefinition(name.clone()));
        }
        if is_enum {
            names.enums.insert(name.clone());
        } else {
            names.interfaces.insert(name.clone());
        }
    }
    Ok(names)
}

fn load_interface(source: &InterfaceSource, names: &DeclaredNames) -> Result<SchemaInterface, SchemaError> {
    if let Some(parent) = &source.extends {
        // External parents have no properties to inherit.
        if !names.interfaces.contains(parent) || names.externals.contains(parent) {
            return Err(SchemaError::UnresolvedReference {
                interface: source.name.clone(),
                name:      parent.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    let mut properties = Vec::new();
    for property in &source.properties {
        check_identifier("property", &property.name)?;
        if !seen.insert(property.name.as_str()) {
            return Err(SchemaError::DuplicateProperty {
                interface: source.name.clone(),
                property:  property.name.clone(),
            });
        }
        properties.push(load_property(&source.name, property, names)?);
    }

    let delegations = source
        .delegations
        .iter()
        .map(|delegation| {
            check_identifier("method", &delegation.method)?;
            if !RUST_PATH.is_match(&delegation.target) {
                return Err(SchemaError::InvalidIdentifier {
                    kind: "delegate target",
                    name: delegation.target.clone(),
                });
            }
            let params = delegation
                .params
                .iter()
                .map(|param| {
                    check_identifier("parameter", &param.name)?;
                    Ok(DelegateParam {
                        name: param.name.clone(),
                        ty:   param.ty.clone(),
                    })
                })
                .collect::<Result<Vec<_>, SchemaError>>()?;
            Ok(Delegation {
                method:  delegation.method.clone(),
                target:  delegation.target.clone(),
                params,
                returns: delegation.returns.clone(),
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(SchemaInterface {
        name: source.name.clone(),
        parent: source.extends.clone(),
        compact: source.compact,
        properties,
        delegations,
    })
}

fn load_property(interface: &str, source: &PropertySource, names: &DeclaredNames) -> Result<Property, SchemaError> {
    let expr = parse_type_expr(&source.type_expr).map_err(|err| SchemaError::MalformedType {
        interface: interface.to_string(),
        property:  source.name.clone(),
        msg:       err.msg,
        column:    err.column,
    })?;
    let ty = resolve_type(&expr, names, 0).map_err(|err| err.at(interface, &source.name))?;

    let index = match source.index {
        Some(index) if index <= 0 || index > i64::from(u32::MAX) => {
            return Err(SchemaError::NonPositiveIndex {
                interface: interface.to_string(),
                property:  source.name.clone(),
                index,
            });
        }
        Some(index) => Some(index as u32),
        None => None,
    };

    Ok(Property {
        name: source.name.clone(),
        ty,
        wire_name: source.wire_name.clone(),
        index,
        nullable: source.nullable,
    })
}

/// A type resolution failure, before the interface and property are known.
#[derive(Debug, PartialEq)]
pub enum ResolveError {
    Arity { container: String, found: usize },
    Unsupported(String),
    Unresolved(String),
}

impl ResolveError {
    pub fn at(self, interface: &str, property: &str) -> SchemaError {
        match self {
            ResolveError::Arity { container, found } => SchemaError::InvalidTypeArity {
                interface: interface.to_string(),
                property:  property.to_string(),
                container,
                found,
            },
            ResolveError::Unsupported(type_name) => SchemaError::UnsupportedGenericType {
                interface: interface.to_string(),
                property:  property.to_string(),
                type_name,
            },
            ResolveError::Unresolved(name) => SchemaError::UnresolvedReference {
                interface: interface.to_string(),
                name,
            },
        }
    }
}

/// Resolves a parsed type expression against the declared names. `depth` is
/// the number of enclosing containers.
pub fn resolve_type(expr: &TypeExpr, names: &DeclaredNames, depth: usize) -> Result<Type, ResolveError> {
    match expr.name.as_str() {
        "List" | "Map" => {
            if expr.args.len() != 1 {
                return Err(ResolveError::Arity {
                    container: expr.name.clone(),
                    found:     expr.args.len(),
                });
            }
            let inner = Box::new(resolve_type(&expr.args[0], names, depth + 1)?);
            Ok(if expr.name == "List" { Type::List(inner) } else { Type::Map(inner) })
        }
        _ if !expr.args.is_empty() => Err(ResolveError::Unsupported(format!("{}<..>", expr.name))),
        "string"  => Ok(Type::Scalar(Scalar::String)),
        "boolean" => Ok(Type::Scalar(Scalar::Boolean)),
        "any"     => Ok(Type::Any),
        name => {
            if let Some(kind) = NumberKind::from_keyword(name) {
                Ok(Type::Scalar(Scalar::Number(kind)))
            } else if names.enums.contains(name) {
                Ok(Type::Enum(name.to_string()))
            } else if names.interfaces.contains(name) {
                Ok(Type::Reference(name.to_string()))
            } else if depth > 0 {
                Err(ResolveError::Unsupported(name.to_string()))
            } else {
                Err(ResolveError::Unresolved(name.to_string()))
            }
        }
    }
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), SchemaError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier { kind, name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: serde_json::Value) -> Result<SchemaSet, SchemaError> {
        let source: SchemaSource = serde_json::from_value(value).unwrap();
        load_interfaces(&source)
    }

    fn single(property: serde_json::Value) -> Result<SchemaSet, SchemaError> {
        load(json!({
            "enums": [{ "name": "Role", "constants": ["ADMIN"] }],
            "interfaces": [
                { "name": "Node" },
                { "name": "Holder", "properties": [property] }
            ]
        }))
    }

    #[test]
    fn resolves_nested_types() {
        let set = single(json!({ "name": "p", "type": "Map<List<Node>>" })).unwrap();
        let holder = set.interface("Holder").unwrap();
        assert_eq!(
            holder.properties[0].ty,
            Type::Map(Box::new(Type::List(Box::new(Type::Reference("Node".into())))))
        );
        let set = single(json!({ "name": "p", "type": "List<Role>" })).unwrap();
        assert_eq!(
            set.interface("Holder").unwrap().properties[0].ty,
            Type::List(Box::new(Type::Enum("Role".into())))
        );
    }

    #[test]
    fn container_arity_is_checked() {
        let err = single(json!({ "name": "p", "type": "Map<string, int>" })).unwrap_err();
        assert_eq!(err, SchemaError::InvalidTypeArity {
            interface: "Holder".into(),
            property:  "p".into(),
            container: "Map".into(),
            found:     2,
        });
        let err = single(json!({ "name": "p", "type": "List" })).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidTypeArity { found: 0, .. }));
    }

    #[test]
    fn unknown_names_depend_on_depth() {
        let err = single(json!({ "name": "p", "type": "Map<Missing>" })).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedGenericType { ref type_name, .. } if type_name == "Missing"));

        let err = single(json!({ "name": "p", "type": "Missing" })).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { ref name, .. } if name == "Missing"));

        let err = single(json!({ "name": "p", "type": "Set<int>" })).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedGenericType { .. }));
    }

    #[test]
    fn malformed_types_report_columns() {
        let err = single(json!({ "name": "p", "type": "List<int" })).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedType { column: 9, .. }));
    }

    #[test]
    fn indices_must_be_positive() {
        let err = single(json!({ "name": "p", "type": "int", "index": 0 })).unwrap_err();
        assert!(matches!(err, SchemaError::NonPositiveIndex { index: 0, .. }));
    }

    #[test]
    fn definitions_are_unique_and_valid() {
        let err = load(json!({ "interfaces": [{ "name": "A" }, { "name": "A" }] })).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateDefinition("A".into()));

        let err = load(json!({ "interfaces": [{ "name": "List" }] })).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));

        let err = load(json!({ "interfaces": [{ "name": "A",
            "properties": [{ "name": "x", "type": "int" }, { "name": "x", "type": "long" }] }] }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateProperty { .. }));

        let err = load(json!({ "interfaces": [{ "name": "A", "extends": "B" }] })).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { ref name, .. } if name == "B"));
    }

    #[test]
    fn externals_resolve_as_references() {
        let set = load(json!({
            "externals": ["Legacy"],
            "interfaces": [{ "name": "A", "properties": [{ "name": "l", "type": "List<Legacy>" }] }]
        }))
        .unwrap();
        let a = set.interface("A").unwrap();
        assert_eq!(a.properties[0].ty, Type::List(Box::new(Type::Reference("Legacy".into()))));
        assert!(!set.is_known_interface(&Type::Reference("Legacy".into())));
    }

    #[test]
    fn externals_cannot_be_extended() {
        let err = load(json!({
            "externals": ["Legacy"],
            "interfaces": [{ "name": "Child", "extends": "Legacy",
                "properties": [{ "name": "x", "type": "int" }] }]
        }))
        .unwrap_err();
        assert_eq!(err, SchemaError::UnresolvedReference { interface: "Child".into(), name: "Legacy".into() });
    }

    #[test]
    fn enum_constants_map_to_distinct_variants() {
        let err = load(json!({ "enums": [{ "name": "Color", "constants": ["DARK_RED", "DarkRed"] }] })).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateConstant { enum_name: "Color".into(), constant: "DarkRed".into() });

        let err = load(json!({ "enums": [{ "name": "Color", "constants": ["RED", "RED"] }] })).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateConstant { ref constant, .. } if constant == "RED"));

        let set = load(json!({ "enums": [{ "name": "Color", "constants": ["RED", "DARK_RED", "self"] }] })).unwrap();
        assert_eq!(set.enums[0].constants.len(), 3);
    }

    #[test]
    fn delegate_targets_must_be_paths() {
        let err = load(json!({ "interfaces": [{ "name": "A",
            "delegations": [{ "method": "m", "target": "not a path" }] }] }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { kind: "delegate target", .. }));
    }
}
