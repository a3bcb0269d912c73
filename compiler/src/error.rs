use thiserror::Error;

/// A schema descriptor that violates the schema model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Property \"{property}\" of compact interface {interface} has no serialization index")]
    MissingIndex {
        interface: String,
        property:  String,
    },

    #[error("Serialization index {index} of property \"{property}\" in {interface} is used twice")]
    DuplicateIndex {
        interface: String,
        property:  String,
        index:     u32,
    },

    #[error("Serialization index {index} of property \"{property}\" in {interface} must be positive")]
    NonPositiveIndex {
        interface: String,
        property:  String,
        index:     i64,
    },

    #[error("{container} in property \"{property}\" of {interface} takes exactly one type argument, found {found}")]
    InvalidTypeArity {
        interface: String,
        property:  String,
        container: String,
        found:     usize,
    },

    #[error("Unsupported type argument {type_name} in property \"{property}\" of {interface}")]
    UnsupportedGenericType {
        interface: String,
        property:  String,
        type_name: String,
    },

    #[error("The type {name} referenced by {interface} is not defined")]
    UnresolvedReference {
        interface: String,
        name:      String,
    },

    #[error("The type {0} is defined twice")]
    DuplicateDefinition(String),

    #[error("Constant {constant} of enum {enum_name} clashes with an earlier constant")]
    DuplicateConstant {
        enum_name: String,
        constant:  String,
    },

    #[error("Property \"{property}\" is declared twice in {interface}")]
    DuplicateProperty {
        interface: String,
        property:  String,
    },

    #[error("Invalid {kind} name \"{name}\"")]
    InvalidIdentifier {
        kind: &'static str,
        name: String,
    },

    #[error("Interface {0} inherits from itself")]
    CyclicInheritance(String),

    #[error("Malformed type of property \"{property}\" in {interface} at column {column}: {msg}")]
    MalformedType {
        interface: String,
        property:  String,
        msg:       String,
        column:    usize,
    },
}

/// A property whose type cannot be expressed by the generated codec.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodecGenError {
    #[error("Unsupported type {type_name} for property \"{property}\" of {interface}")]
    UnsupportedType {
        interface: String,
        property:  String,
        type_name: String,
    },
}

/// Syntax error in a type expression such as `List<Map<int>>`.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{msg} at column {column}")]
pub struct TypeSyntaxError {
    pub msg:    String,
    pub column: usize,
}

#[derive(Debug, Error)]
pub enum DtoGenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Code generation error: {0}")]
    Codec(#[from] CodecGenError),

    #[error("Type syntax error: {0}")]
    TypeSyntax(#[from] TypeSyntaxError),

    #[error("Invalid override for {interface}: \"{path}\" is not a Rust type path")]
    InvalidOverride {
        interface: String,
        path:      String,
    },
}
