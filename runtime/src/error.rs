use serde_json::Value;
use thiserror::Error;

/// Failure while decoding wire data into a generated DTO.
///
/// Missing object keys and short compact arrays are not errors; they leave
/// the property at its default.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected {expected} for \"{path}\" but found {found}")]
    TypeMismatch {
        path:     String,
        expected: &'static str,
        found:    &'static str,
    },

    #[error("No constant \"{value}\" in enum {enum_name} (at \"{path}\")")]
    UnknownEnumConstant {
        path:      String,
        enum_name: &'static str,
        value:     String,
    },

    #[error("Null element in \"{0}\"")]
    NullElement(String),
}

impl DecodeError {
    pub fn mismatch(path: &str, expected: &'static str, found: &Value) -> Self {
        DecodeError::TypeMismatch {
            path: path.to_string(),
            expected,
            found: json_kind(found),
        }
    }
}

/// Name of the JSON kind of `value`, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}
