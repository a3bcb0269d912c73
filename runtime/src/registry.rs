//! Dispatch table mapping schema interface names to their implementations.
//!
//! Each generated variant module exposes a `registry()` function that
//! registers one [`DtoProvider`] per interface. Interfaces implemented
//! outside of the generated module are registered the same way, against the
//! external type.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::{error::DecodeError, JsonSerializable};

/// A type-erased DTO instance handed out by a [`DtoProvider`].
pub trait AnyDto: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Wire form of the instance, with `Any` properties copied.
    fn wire_value(&self) -> Value;
}

impl<T> AnyDto for T
where
    T: JsonSerializable + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn wire_value(&self) -> Value {
        self.to_json_value()
    }
}

impl dyn AnyDto {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }
}

/// Factory, parse and clone operations for one schema interface.
pub trait DtoProvider: Send + Sync {
    fn interface_name(&self) -> &'static str;

    /// Name of the implementing type.
    fn impl_name(&self) -> &'static str;

    fn new_instance(&self) -> Box<dyn AnyDto>;

    fn from_wire_str(&self, text: &str) -> Result<Option<Box<dyn AnyDto>>, DecodeError>;

    fn from_wire_value(&self, value: Value) -> Result<Option<Box<dyn AnyDto>>, DecodeError>;

    /// Deep copy of `origin`, or `None` if it is not an instance of this
    /// provider's implementation.
    fn clone_dto(&self, origin: &dyn AnyDto) -> Option<Box<dyn AnyDto>>;
}

/// [`DtoProvider`] backed by a concrete implementation type.
pub struct TypedProvider<T> {
    interface_name: &'static str,
    impl_name:      &'static str,
    _marker:        PhantomData<fn() -> T>,
}

impl<T> TypedProvider<T> {
    pub fn new(interface_name: &'static str, impl_name: &'static str) -> Self {
        TypedProvider {
            interface_name,
            impl_name,
            _marker: PhantomData,
        }
    }
}

impl<T> DtoProvider for TypedProvider<T>
where
    T: JsonSerializable + Default + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn interface_name(&self) -> &'static str {
        self.interface_name
    }

    fn impl_name(&self) -> &'static str {
        self.impl_name
    }

    fn new_instance(&self) -> Box<dyn AnyDto> {
        Box::new(T::default())
    }

    fn from_wire_str(&self, text: &str) -> Result<Option<Box<dyn AnyDto>>, DecodeError> {
        Ok(T::from_json_str(text)?.map(|dto| Box::new(dto) as Box<dyn AnyDto>))
    }

    fn from_wire_value(&self, value: Value) -> Result<Option<Box<dyn AnyDto>>, DecodeError> {
        Ok(T::from_json_value(value)?.map(|dto| Box::new(dto) as Box<dyn AnyDto>))
    }

    fn clone_dto(&self, origin: &dyn AnyDto) -> Option<Box<dyn AnyDto>> {
        origin
            .downcast_ref::<T>()
            .map(|dto| Box::new(dto.clone()) as Box<dyn AnyDto>)
    }
}

/// Providers keyed by interface name.
#[derive(Default)]
pub struct DtoRegistry {
    providers: BTreeMap<&'static str, Box<dyn DtoProvider>>,
}

impl DtoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider`, replacing any provider for the same interface.
    pub fn register<P>(&mut self, provider: P) -> &mut Self
    where
        P: DtoProvider + 'static,
    {
        self.providers.insert(provider.interface_name(), Box::new(provider));
        self
    }

    pub fn get(&self, interface_name: &str) -> Option<&dyn DtoProvider> {
        self.providers.get(interface_name).map(|provider| provider.as_ref())
    }

    pub fn contains(&self, interface_name: &str) -> bool {
        self.providers.contains_key(interface_name)
    }

    /// Interface names in sorted order.
    pub fn interface_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for DtoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.providers.iter().map(|(name, provider)| (name, provider.impl_name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Note {
        text: Option<String>,
    }

    impl JsonSerializable for Note {
        fn to_json_value_with(&self, _copy_jsons: bool) -> Value {
            match &self.text {
                Some(text) => json!({ "text": text }),
                None => json!({}),
            }
        }

        fn from_json_value_with(value: Value, _copy_jsons: bool) -> Result<Option<Self>, DecodeError> {
            match value {
                Value::Null => Ok(None),
                Value::Object(mut json) => Ok(Some(Note {
                    text: match json.remove("text") {
                        Some(text) => crate::decode_opt_string(text, "Note.text")?,
                        None => None,
                    },
                })),
                other => Err(DecodeError::mismatch("Note", "object", &other)),
            }
        }
    }

    fn registry() -> DtoRegistry {
        let mut registry = DtoRegistry::new();
        registry.register(TypedProvider::<Note>::new("Note", "Note"));
        registry
    }

    #[test]
    fn provider_parses_and_clones() {
        let registry = registry();
        let provider = registry.get("Note").unwrap();
        assert_eq!(provider.impl_name(), "Note");

        let parsed = provider.from_wire_str(r#"{"text":"hi"}"#).unwrap().unwrap();
        let note = parsed.downcast_ref::<Note>().unwrap();
        assert_eq!(note.text.as_deref(), Some("hi"));

        let copy = provider.clone_dto(parsed.as_ref()).unwrap();
        assert_eq!(copy.wire_value(), json!({ "text": "hi" }));
        assert!(provider.from_wire_value(Value::Null).unwrap().is_none());
    }

    #[test]
    fn unknown_interface_is_absent() {
        let registry = registry();
        assert!(registry.get("Missing").is_none());
        assert_eq!(registry.interface_names().collect::<Vec<_>>(), vec!["Note"]);
        assert_eq!(registry.len(), 1);
    }
}
