//! Structural hashing for generated DTOs.
//!
//! Generated `hash` bodies accumulate `hash = hash * 31 + property_hash`
//! starting from 7. The per-type hashes below are stable across runs and
//! platforms, and maps hash independently of iteration order so that the
//! client (`HashMap`) and server (`BTreeMap`) variants agree.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::Value;

/// Seed of every generated DTO hash.
pub const HASH_SEED: i32 = 7;

pub trait DtoHash {
    fn dto_hash(&self) -> i32;
}

/// One accumulation step of a generated hash body.
pub fn hash_step(hash: i32, property_hash: i32) -> i32 {
    hash.wrapping_mul(31).wrapping_add(property_hash)
}

/// Hashes a container property under the ensure rule: a container that was
/// never materialized hashes like an empty one.
pub fn ensured_hash<C>(container: &Option<C>) -> i32
where
    C: DtoHash + Default,
{
    match container {
        Some(c) => c.dto_hash(),
        None => C::default().dto_hash(),
    }
}

impl DtoHash for bool {
    fn dto_hash(&self) -> i32 {
        if *self { 1231 } else { 1237 }
    }
}

impl DtoHash for i8 {
    fn dto_hash(&self) -> i32 {
        i32::from(*self)
    }
}

impl DtoHash for i16 {
    fn dto_hash(&self) -> i32 {
        i32::from(*self)
    }
}

impl DtoHash for i32 {
    fn dto_hash(&self) -> i32 {
        *self
    }
}

impl DtoHash for i64 {
    fn dto_hash(&self) -> i32 {
        (*self ^ (*self >> 32)) as i32
    }
}

impl DtoHash for f32 {
    fn dto_hash(&self) -> i32 {
        self.to_bits() as i32
    }
}

impl DtoHash for f64 {
    fn dto_hash(&self) -> i32 {
        let bits = self.to_bits();
        (bits ^ (bits >> 32)) as i32
    }
}

impl DtoHash for str {
    fn dto_hash(&self) -> i32 {
        self.bytes().fold(0i32, |hash, b| hash_step(hash, i32::from(b)))
    }
}

impl DtoHash for String {
    fn dto_hash(&self) -> i32 {
        self.as_str().dto_hash()
    }
}

impl<T: DtoHash + ?Sized> DtoHash for Box<T> {
    fn dto_hash(&self) -> i32 {
        (**self).dto_hash()
    }
}

impl<T: DtoHash> DtoHash for Option<T> {
    fn dto_hash(&self) -> i32 {
        match self {
            Some(value) => value.dto_hash(),
            None => 0,
        }
    }
}

impl<T: DtoHash> DtoHash for Vec<T> {
    fn dto_hash(&self) -> i32 {
        self.iter().fold(1i32, |hash, item| hash_step(hash, item.dto_hash()))
    }
}

impl<V: DtoHash, S: BuildHasher> DtoHash for HashMap<String, V, S> {
    fn dto_hash(&self) -> i32 {
        self.iter()
            .fold(0i32, |hash, (key, value)| hash.wrapping_add(key.dto_hash() ^ value.dto_hash()))
    }
}

impl<V: DtoHash> DtoHash for BTreeMap<String, V> {
    fn dto_hash(&self) -> i32 {
        self.iter()
            .fold(0i32, |hash, (key, value)| hash.wrapping_add(key.dto_hash() ^ value.dto_hash()))
    }
}

impl DtoHash for Value {
    fn dto_hash(&self) -> i32 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => b.dto_hash(),
            Value::Number(n) => n.as_f64().unwrap_or_default().dto_hash(),
            Value::String(s) => s.dto_hash(),
            Value::Array(items) => items.dto_hash(),
            Value::Object(entries) => entries
                .iter()
                .fold(0i32, |hash, (key, value)| hash.wrapping_add(key.dto_hash() ^ value.dto_hash())),
        }
    }
}
