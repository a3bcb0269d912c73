//! The per-variant differences of the generated code.
//!
//! Both variants share one emitter; a policy only decides which concrete
//! container types back List/Map properties and how the wire value is
//! assembled.

use crate::types::Variant;

/// Trailing List/Map slot of a compact array, pushed only when non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingSlot {
    /// Rust field holding the container.
    pub field:  String,
    /// Encoding of the container bound to `v0`.
    pub encode: String,
}

pub trait VariantPolicy {
    fn variant(&self) -> Variant;

    fn list_type(&self, element: &str) -> String {
        format!("Vec<{}>", element)
    }

    fn map_type(&self, value: &str) -> String;

    /// Doc line above every generated struct.
    fn marker(&self, interface: &str) -> String;

    /// Statements building a field-named wire object from `(key literal,
    /// value expression)` pairs. The last line is the resulting value.
    fn object_body(&self, entries: &[(String, String)]) -> Vec<String>;

    /// Statements building a compact wire array from one expression per slot.
    /// The last line is the resulting value.
    fn array_body(&self, slots: &[String], trailing: Option<&TrailingSlot>) -> Vec<String>;
}

pub struct ClientPolicy;

pub struct ServerPolicy;

pub fn policy_for(variant: Variant) -> &'static dyn VariantPolicy {
    match variant {
        Variant::Client => &ClientPolicy,
        Variant::Server => &ServerPolicy,
    }
}

fn push_trailing(lines: &mut Vec<String>, trailing: &TrailingSlot) {
    lines.push(format!(
        "if let Some(v0) = self.{}.as_ref().filter(|v0| !v0.is_empty()) {{",
        trailing.field
    ));
    lines.push(format!("    json.push({});", trailing.encode));
    lines.push("}".to_string());
}

impl VariantPolicy for ClientPolicy {
    fn variant(&self) -> Variant {
        Variant::Client
    }

    fn map_type(&self, value: &str) -> String {
        format!("std::collections::HashMap<String, {}>", value)
    }

    fn marker(&self, interface: &str) -> String {
        format!("/// Client implementation of the `{}` DTO.", interface)
    }

    fn object_body(&self, entries: &[(String, String)]) -> Vec<String> {
        if entries.is_empty() {
            return vec!["dtogen_runtime::Value::Object(dtogen_runtime::JsonObject::new())".to_string()];
        }
        let mut lines = vec!["let mut json = dtogen_runtime::JsonObject::new();".to_string()];
        for (key, value) in entries {
            lines.push(format!("json.insert({}.to_string(), {});", key, value));
        }
        lines.push("dtogen_runtime::Value::Object(json)".to_string());
        lines
    }

    fn array_body(&self, slots: &[String], trailing: Option<&TrailingSlot>) -> Vec<String> {
        if slots.is_empty() && trailing.is_none() {
            return vec!["dtogen_runtime::Value::Array(Vec::new())".to_string()];
        }
        let mut lines = vec!["let mut json = Vec::new();".to_string()];
        for slot in slots {
            lines.push(format!("json.push({});", slot));
        }
        if let Some(trailing) = trailing {
            push_trailing(&mut lines, trailing);
        }
        lines.push("dtogen_runtime::Value::Array(json)".to_string());
        lines
    }
}

impl VariantPolicy for ServerPolicy {
    fn variant(&self) -> Variant {
        Variant::Server
    }

    fn map_type(&self, value: &str) -> String {
        format!("std::collections::BTreeMap<String, {}>", value)
    }

    fn marker(&self, interface: &str) -> String {
        format!("/// Server implementation of the `{}` DTO.", interface)
    }

    fn object_body(&self, entries: &[(String, String)]) -> Vec<String> {
        if entries.is_empty() {
            return vec!["dtogen_runtime::Value::Object(dtogen_runtime::JsonObject::new())".to_string()];
        }
        let mut lines = vec!["let entries = [".to_string()];
        for (key, value) in entries {
            lines.push(format!("    ({}.to_string(), {}),", key, value));
        }
        lines.push("];".to_string());
        lines.push("dtogen_runtime::Value::Object(entries.into_iter().collect())".to_string());
        lines
    }

    fn array_body(&self, slots: &[String], trailing: Option<&TrailingSlot>) -> Vec<String> {
        let binding = if trailing.is_some() { "let mut json" } else { "let json" };
        let mut lines = vec![format!("{}: Vec<dtogen_runtime::Value> = vec![", binding)];
        for slot in slots {
            lines.push(format!("    {},", slot));
        }
        lines.push("];".to_string());
        if let Some(trailing) = trailing {
            push_trailing(&mut lines, trailing);
        }
        lines.push("dtogen_runtime::Value::Array(json)".to_string());
        lines
    }
}
