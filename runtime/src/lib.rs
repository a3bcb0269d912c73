//! Runtime support for DTO implementations generated by `dtogen`.
//!
//! Generated modules only depend on this crate (and, through it, on
//! `serde_json`). It provides:
//!
//! - [`JsonSerializable`]: the encode/decode entry points every generated DTO implements,
//! - wire helpers for numeric narrowing, enum lookup and the naive JSON clone,
//! - [`DtoHash`]: the structural hash used by generated `Hash` impls,
//! - [`DtoRegistry`]: the per-variant dispatch table.
//!
//! ```
//! use dtogen_runtime::{decode_number, encode_number, Value};
//!
//! let wire = encode_number(7i32);
//! assert_eq!(wire.to_string(), "7");
//! let back: i32 = decode_number(&wire, "Point.x").unwrap();
//! assert_eq!(back, 7);
//! ```

pub mod error;
pub mod hash;
pub mod registry;
pub mod wire;

pub use error::DecodeError;
pub use hash::{ensured_hash, hash_step, DtoHash, HASH_SEED};
pub use registry::{AnyDto, DtoProvider, DtoRegistry, TypedProvider};
pub use wire::*;

pub use serde_json;
pub use serde_json::Value;

/// JSON object used by the field-named encoding.
pub type JsonObject = serde_json::Map<String, Value>;

/// Encode/decode entry points of a generated DTO.
///
/// Implementations only provide the explicit forms taking `copy_jsons`; the
/// safe forms always call them with `true`, so `Any` properties never alias
/// the caller's JSON.
pub trait JsonSerializable: Sized {
    /// Encodes `self`. With `copy_jsons`, `Any` properties are cloned through
    /// the JSON text parser, otherwise they are cloned structurally.
    fn to_json_value_with(&self, copy_jsons: bool) -> Value;

    /// Decodes `value`, returning `None` for JSON `null`. With `copy_jsons`,
    /// `Any` properties are cloned through the JSON text parser, otherwise
    /// they are moved out of `value`.
    fn from_json_value_with(value: Value, copy_jsons: bool) -> Result<Option<Self>, DecodeError>;

    fn to_json_value(&self) -> Value {
        self.to_json_value_with(true)
    }

    fn from_json_value(value: Value) -> Result<Option<Self>, DecodeError> {
        Self::from_json_value_with(value, true)
    }

    /// Serializes to JSON text. The intermediate value is never shared, so
    /// no copies are made.
    fn to_json(&self) -> String {
        self.to_json_value_with(false).to_string()
    }

    /// Parses JSON text and decodes it. The parsed value is owned here, so
    /// `Any` properties are moved rather than copied.
    fn from_json_str(text: &str) -> Result<Option<Self>, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value_with(value, false)
    }
}

/// Compares two container properties under the ensure rule: a container that
/// was never materialized equals an empty one.
pub fn ensured_eq<C>(a: &Option<C>, b: &Option<C>) -> bool
where
    C: Default + PartialEq,
{
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (Some(c), None) | (None, Some(c)) => *c == C::default(),
        (None, None) => true,
    }
}
