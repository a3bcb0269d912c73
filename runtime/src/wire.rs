//! Wire helpers called from generated codecs.
//!
//! Numbers always travel as double-precision values: encoding widens to
//! `f64`, decoding reads an `f64` and truncates it to the declared kind with
//! `as`. Large `long` values therefore lose precision on the wire, exactly
//! like the JSON-number-is-double assumption of existing consumers.

use serde_json::{Number, Value};

use crate::error::DecodeError;

/// A numeric kind that can be carried as a JSON number.
pub trait WireNumber: Copy {
    fn from_wire(wire: f64) -> Self;
    fn to_wire(self) -> f64;
}

macro_rules! wire_number {
    ($($ty:ty),*) => {
        $(
            impl WireNumber for $ty {
                fn from_wire(wire: f64) -> Self {
                    wire as $ty
                }

                fn to_wire(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

wire_number!(i8, i16, i32, i64, f32, f64);

/// An enum carried on the wire by its constant name.
pub trait WireEnum: Sized + Copy {
    /// Name of the enum, for error messages.
    const ENUM_NAME: &'static str;

    fn name(&self) -> &'static str;

    /// Exact, case-sensitive constant lookup.
    fn from_name(name: &str) -> Option<Self>;
}

/// Writes a number. Integral values are written without a fractional part,
/// non-finite values as `null`.
pub fn encode_number<N: WireNumber>(n: N) -> Value {
    let wire = n.to_wire();
    if wire.fract() == 0.0 && wire >= i64::MIN as f64 && wire < i64::MAX as f64 {
        Value::from(wire as i64)
    } else {
        Number::from_f64(wire).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Reads a number as `f64` and narrows it to `N`.
pub fn decode_number<N: WireNumber>(value: &Value, path: &str) -> Result<N, DecodeError> {
    match value.as_f64() {
        Some(wire) => Ok(N::from_wire(wire)),
        None => Err(DecodeError::mismatch(path, "number", value)),
    }
}

/// Like [`decode_number`], with `null` mapping to `None`.
pub fn decode_opt_number<N: WireNumber>(value: &Value, path: &str) -> Result<Option<N>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => decode_number(other, path).map(Some),
    }
}

pub fn decode_bool(value: &Value, path: &str) -> Result<bool, DecodeError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(DecodeError::mismatch(path, "boolean", other)),
    }
}

pub fn decode_opt_bool(value: &Value, path: &str) -> Result<Option<bool>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => decode_bool(other, path).map(Some),
    }
}

pub fn decode_string(value: Value, path: &str) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(DecodeError::mismatch(path, "string", &other)),
    }
}

pub fn decode_opt_string(value: Value, path: &str) -> Result<Option<String>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => decode_string(other, path).map(Some),
    }
}

pub fn encode_enum<E: WireEnum>(constant: &E) -> Value {
    Value::String(constant.name().to_string())
}

/// Decodes an enum constant. An unknown name fails the whole decode.
pub fn decode_enum<E: WireEnum>(value: &Value, path: &str) -> Result<E, DecodeError> {
    match value {
        Value::String(name) => E::from_name(name).ok_or_else(|| DecodeError::UnknownEnumConstant {
            path:      path.to_string(),
            enum_name: E::ENUM_NAME,
            value:     name.clone(),
        }),
        other => Err(DecodeError::mismatch(path, "string", other)),
    }
}

pub fn decode_opt_enum<E: WireEnum>(value: &Value, path: &str) -> Result<Option<E>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => decode_enum(other, path).map(Some),
    }
}

/// Naive deep clone of a JSON value: print it and parse it back.
pub fn copy_json(value: &Value) -> Value {
    serde_json::from_str(&value.to_string()).unwrap_or_else(|_| value.clone())
}

/// Encodes an `Any` property.
pub fn encode_any(value: &Value, copy_jsons: bool) -> Value {
    if copy_jsons {
        copy_json(value)
    } else {
        value.clone()
    }
}

/// Decodes an `Any` property, keeping the owned value unless a copy is asked for.
pub fn decode_any(value: Value, copy_jsons: bool) -> Value {
    if copy_jsons {
        copy_json(&value)
    } else {
        value
    }
}

/// Decodes a top-level `Any` property; `null` maps to `None`, which is also
/// how generated setters store a `null` value.
pub fn decode_opt_any(value: Value, copy_jsons: bool) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(decode_any(other, copy_jsons)),
    }
}

/// Decodes a JSON array element by element. `null` maps to `None`.
pub fn decode_list<T, F>(value: Value, path: &str, decode: F) -> Result<Option<Vec<T>>, DecodeError>
where
    F: FnMut(Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items.into_iter().map(decode).collect::<Result<Vec<T>, _>>().map(Some),
        other => Err(DecodeError::mismatch(path, "array", &other)),
    }
}

/// Decodes a JSON object into a string-keyed map, one value at a time. `null`
/// maps to `None`.
pub fn decode_map<M, T, F>(value: Value, path: &str, mut decode: F) -> Result<Option<M>, DecodeError>
where
    M: FromIterator<(String, T)>,
    F: FnMut(Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Null => Ok(None),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, value)| decode(value).map(|value| (key, value)))
            .collect::<Result<M, _>>()
            .map(Some),
        other => Err(DecodeError::mismatch(path, "object", &other)),
    }
}

/// Rejects a `null` container element that must hold a value.
pub fn require<T>(element: Option<T>, path: &str) -> Result<T, DecodeError> {
    element.ok_or_else(|| DecodeError::NullElement(path.to_string()))
}
