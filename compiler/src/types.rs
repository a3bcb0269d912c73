use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
}

impl NumberKind {
    pub const ALL: [NumberKind; 6] = [
        NumberKind::Int,
        NumberKind::Long,
        NumberKind::Short,
        NumberKind::Byte,
        NumberKind::Float,
        NumberKind::Double,
    ];

    /// Keyword used for this kind in type expressions.
    pub fn keyword(self) -> &'static str {
        match self {
            NumberKind::Int    => "int",
            NumberKind::Long   => "long",
            NumberKind::Short  => "short",
            NumberKind::Byte   => "byte",
            NumberKind::Float  => "float",
            NumberKind::Double => "double",
        }
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            NumberKind::Int    => "i32",
            NumberKind::Long   => "i64",
            NumberKind::Short  => "i16",
            NumberKind::Byte   => "i8",
            NumberKind::Float  => "f32",
            NumberKind::Double => "f64",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        NumberKind::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    String,
    Number(NumberKind),
    Boolean,
}

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(Scalar),
    Enum(String),
    List(Box<Type>),
    /// String-keyed map.
    Map(Box<Type>),
    Reference(String),
    Any,
}

impl Type {
    pub fn is_container(&self) -> bool {
        matches!(self, Type::List(_) | Type::Map(_))
    }

    /// Element type of a List, value type of a Map.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(inner) | Type::Map(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(Scalar::String)       => write!(f, "string"),
            Type::Scalar(Scalar::Boolean)      => write!(f, "boolean"),
            Type::Scalar(Scalar::Number(kind)) => write!(f, "{}", kind.keyword()),
            Type::Enum(name) | Type::Reference(name) => write!(f, "{}", name),
            Type::List(inner) => write!(f, "List<{}>", inner),
            Type::Map(inner)  => write!(f, "Map<{}>", inner),
            Type::Any         => write!(f, "any"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name:      String,
    pub ty:        Type,
    pub wire_name: Option<String>,
    pub index:     Option<u32>,
    pub nullable:  bool,
}

impl Property {
    /// Key of this property in the field-named encoding.
    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelegateParam {
    pub name: String,
    /// Rust type text, emitted verbatim.
    pub ty:   String,
}

/// A method forwarded to an external function taking the DTO as first argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Delegation {
    pub method:  String,
    pub target:  String,
    pub params:  Vec<DelegateParam>,
    pub returns: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInterface {
    pub name:        String,
    pub parent:      Option<String>,
    pub compact:     bool,
    pub properties:  Vec<Property>,
    pub delegations: Vec<Delegation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name:      String,
    pub constants: Vec<String>,
}

/// Position in a compact array: a property, or an index no property uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertySlot<'a> {
    Property(&'a Property),
    Hole(u32),
}

impl<'a> PropertySlot<'a> {
    pub fn property(&self) -> Option<&'a Property> {
        match self {
            PropertySlot::Property(property) => Some(property),
            PropertySlot::Hole(_) => None,
        }
    }
}

/// Validated schema, immutable after loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSet {
    pub package:    Option<String>,
    pub enums:      Vec<EnumDef>,
    pub interfaces: Vec<SchemaInterface>,
    /// Interfaces declared outside the schema; their implementation must come
    /// from the override table.
    pub externals:  Vec<String>,
}

impl SchemaSet {
    pub fn interface(&self, name: &str) -> Option<&SchemaInterface> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|def| def.name == name)
    }

    /// True only for a reference to an interface loaded into this set.
    pub fn is_known_interface(&self, ty: &Type) -> bool {
        match ty {
            Type::Reference(name) => self.interface(name).is_some(),
            _ => false,
        }
    }

    /// Ancestors of `iface`, root first. Stops at a missing parent or a cycle.
    pub fn ancestors<'a>(&'a self, iface: &'a SchemaInterface) -> Vec<&'a SchemaInterface> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(iface.name.as_str());

        let mut parent = iface.parent.as_deref();
        while let Some(name) = parent {
            if !seen.insert(name) {
                break;
            }
            match self.interface(name) {
                Some(ancestor) => {
                    chain.push(ancestor);
                    parent = ancestor.parent.as_deref();
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Own properties in declaration order. Compact interfaces list them in
    /// index order, with a hole for every unused index.
    pub fn own_properties<'a>(&'a self, iface: &'a SchemaInterface) -> Vec<PropertySlot<'a>> {
        let own: Vec<&Property> = iface.properties.iter().collect();
        if iface.compact {
            index_slots(own)
        } else {
            own.into_iter().map(PropertySlot::Property).collect()
        }
    }

    /// Ancestor properties first, then own ones. A redeclared property keeps
    /// the ancestor's position but takes the descendant's definition.
    pub fn all_properties<'a>(&'a self, iface: &'a SchemaInterface) -> Vec<&'a Property> {
        let mut all: Vec<&Property> = Vec::new();
        for declaring in self.ancestors(iface).into_iter().chain(std::iter::once(iface)) {
            for property in &declaring.properties {
                match all.iter().position(|p| p.name == property.name) {
                    Some(i) => all[i] = property,
                    None => all.push(property),
                }
            }
        }
        all
    }

    /// Slots of the compact array of `iface`, over all its properties.
    pub fn compact_slots<'a>(&'a self, iface: &'a SchemaInterface) -> Vec<PropertySlot<'a>> {
        index_slots(self.all_properties(iface))
    }
}

fn index_slots(properties: Vec<&Property>) -> Vec<PropertySlot<'_>> {
    let last = properties.iter().filter_map(|p| p.index).max().unwrap_or(0);
    (1..=last)
        .map(|index| {
            properties
                .iter()
                .find(|p| p.index == Some(index))
                .map_or(PropertySlot::Hole(index), |p| PropertySlot::Property(*p))
        })
        .collect()
}

/// One of the two generated implementation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Client,
    Server,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Client => "client",
            Variant::Server => "server",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Variant::Client),
            "server" => Ok(Variant::Server),
            other => Err(format!("unknown variant \"{}\", expected client or server", other)),
        }
    }
}

/// Emitted source of one interface for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImplementation {
    pub interface:   String,
    pub impl_name:   String,
    pub variant:     Variant,
    /// Struct declaration with its fields.
    pub declaration: String,
    /// Constructor, accessors, mutators, deep copy and delegates.
    pub methods:     String,
    /// `JsonSerializable` impl.
    pub codec:       String,
    /// `PartialEq`, `DtoHash`, `Hash`, `Clone` and upcasting impls.
    pub structural:  String,
}

impl GeneratedImplementation {
    pub fn source(&self) -> String {
        [&self.declaration, &self.methods, &self.codec, &self.structural]
            .iter()
            .map(|fragment| fragment.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
