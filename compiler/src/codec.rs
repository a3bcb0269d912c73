//! Emits the `JsonSerializable` impl of a DTO.
//!
//! Field-named interfaces travel as JSON objects keyed by wire name, compact
//! ones as arrays where the property with index N sits at offset N-1. Both
//! strategies share the per-layer emitters below, which recurse along the
//! property's [`TypeExpansion`].

use crate::{
    context::{field, impl_name, property_path, storage, uses_copy_jsons, GenContext, Storage},
    error::CodecGenError,
    expand::{expand, LayerKind, TypeExpansion},
    policy::TrailingSlot,
    types::{Property, PropertySlot, Scalar, SchemaInterface, Type},
    utils::rust_str,
};

pub fn emit_codec(ctx: &GenContext<'_>, iface: &SchemaInterface) -> Result<String, CodecGenError> {
    ctx.check_interface(iface)?;

    let properties = ctx.schema.all_properties(iface);
    let copy_flag = if properties.iter().any(|p| uses_copy_jsons(p)) {
        "copy_jsons"
    } else {
        "_copy_jsons"
    };

    let (encoder, decoder) = if iface.compact {
        (compact_encoder(ctx, iface), compact_decoder(ctx, iface))
    } else {
        (field_encoder(ctx, &properties), field_decoder(ctx, iface, &properties))
    };

    let mut lines = Vec::new();
    lines.push(format!("impl dtogen_runtime::JsonSerializable for {} {{", impl_name(&iface.name)));
    lines.push(format!("    fn to_json_value_with(&self, {}: bool) -> dtogen_runtime::Value {{", copy_flag));
    lines.extend(indent(encoder, 8));
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push(format!(
        "    fn from_json_value_with(value: dtogen_runtime::Value, {}: bool) -> Result<Option<Self>, dtogen_runtime::DecodeError> {{",
        copy_flag
    ));
    lines.extend(indent(decoder, 8));
    lines.push("    }".to_string());
    lines.push("}".to_string());
    Ok(lines.join("\n"))
}

pub fn indent(lines: Vec<String>, width: usize) -> Vec<String> {
    let pad = " ".repeat(width);
    lines
        .into_iter()
        .map(|line| if line.is_empty() { line } else { format!("{}{}", pad, line) })
        .collect()
}

fn field_encoder(ctx: &GenContext<'_>, properties: &[&Property]) -> Vec<String> {
    let entries: Vec<(String, String)> = properties
        .iter()
        .map(|property| (rust_str(property.wire_name()), encode_property(property)))
        .collect();
    ctx.policy.object_body(&entries)
}

fn compact_encoder(ctx: &GenContext<'_>, iface: &SchemaInterface) -> Vec<String> {
    let mut slots = ctx.schema.compact_slots(iface);

    // A List/Map in the last slot is only written when it has entries
    let trailing = match slots.last().copied() {
        Some(PropertySlot::Property(property)) if property.ty.is_container() => {
            let expansion = expand(&property.ty);
            let trailing = TrailingSlot {
                field:  field(property),
                encode: encode_layer(&expansion, 0, "v0"),
            };
            slots.pop();
            Some(trailing)
        }
        _ => None,
    };

    let encoded: Vec<String> = slots
        .iter()
        .map(|slot| match slot {
            PropertySlot::Property(property) => encode_property(property),
            PropertySlot::Hole(_) => "dtogen_runtime::Value::Null".to_string(),
        })
        .collect();
    ctx.policy.array_body(&encoded, trailing.as_ref())
}

/// Wire value of `self.<field>`.
fn encode_property(property: &Property) -> String {
    let field = field(property);
    let expansion = expand(&property.ty);
    let absent = match storage(property) {
        Storage::Plain => {
            return match &property.ty {
                Type::Scalar(Scalar::Boolean) => format!("dtogen_runtime::Value::Bool(self.{})", field),
                _ => format!("dtogen_runtime::encode_number(self.{})", field),
            };
        }
        Storage::Container if expansion.kind(0) == LayerKind::Map => {
            "dtogen_runtime::Value::Object(dtogen_runtime::JsonObject::new())"
        }
        Storage::Container => "dtogen_runtime::Value::Array(Vec::new())",
        Storage::Optional | Storage::Boxed => "dtogen_runtime::Value::Null",
    };
    format!(
        "match &self.{} {{ Some(v0) => {}, None => {} }}",
        field,
        encode_layer(&expansion, 0, "v0"),
        absent
    )
}

/// Wire value of the layer at `depth`, borrowed as `var`.
fn encode_layer(expansion: &TypeExpansion<'_>, depth: usize, var: &str) -> String {
    let next = format!("v{}", depth + 1);
    match expansion.at(depth) {
        Type::Scalar(Scalar::Number(_)) => format!("dtogen_runtime::encode_number(*{})", var),
        Type::Scalar(Scalar::Boolean)   => format!("dtogen_runtime::Value::Bool(*{})", var),
        Type::Scalar(Scalar::String)    => format!("dtogen_runtime::Value::String({}.clone())", var),
        Type::Enum(_)      => format!("dtogen_runtime::encode_enum({})", var),
        Type::Reference(_) => format!("{}.to_json_value_with(copy_jsons)", var),
        Type::Any          => format!("dtogen_runtime::encode_any({}, copy_jsons)", var),
        Type::List(_) => format!(
            "dtogen_runtime::Value::Array({}.iter().map(|{}| {}).collect())",
            var,
            next,
            encode_layer(expansion, depth + 1, &next)
        ),
        Type::Map(_) => format!(
            "dtogen_runtime::Value::Object({}.iter().map(|(k{}, {})| (k{}.clone(), {})).collect())",
            var,
            depth,
            next,
            depth,
            encode_layer(expansion, depth + 1, &next)
        ),
    }
}

fn field_decoder(ctx: &GenContext<'_>, iface: &SchemaInterface, properties: &[&Property]) -> Vec<String> {
    let name = rust_str(&iface.name);
    if properties.is_empty() {
        return vec![
            "match value {".to_string(),
            "    dtogen_runtime::Value::Null => Ok(None),".to_string(),
            "    dtogen_runtime::Value::Object(_) => Ok(Some(Self::default())),".to_string(),
            format!("    other => Err(dtogen_runtime::DecodeError::mismatch({}, \"object\", &other)),", name),
            "}".to_string(),
        ];
    }

    let mut lines = vec![
        "let mut json = match value {".to_string(),
        "    dtogen_runtime::Value::Null => return Ok(None),".to_string(),
        "    dtogen_runtime::Value::Object(json) => json,".to_string(),
        format!("    other => return Err(dtogen_runtime::DecodeError::mismatch({}, \"object\", &other)),", name),
        "};".to_string(),
        "let mut dto = Self::default();".to_string(),
    ];
    for property in properties {
        lines.push(format!("if let Some(v0) = json.remove({}) {{", rust_str(property.wire_name())));
        push_assignment(ctx, iface, property, &mut lines);
    }
    lines.push("Ok(Some(dto))".to_string());
    lines
}

fn compact_decoder(ctx: &GenContext<'_>, iface: &SchemaInterface) -> Vec<String> {
    let name = rust_str(&iface.name);
    let slots = ctx.schema.compact_slots(iface);
    if slots.iter().all(|slot| slot.property().is_none()) {
        return vec![
            "match value {".to_string(),
            "    dtogen_runtime::Value::Null => Ok(None),".to_string(),
            "    dtogen_runtime::Value::Array(_) => Ok(Some(Self::default())),".to_string(),
            format!("    other => Err(dtogen_runtime::DecodeError::mismatch({}, \"array\", &other)),", name),
            "}".to_string(),
        ];
    }

    let mut lines = vec![
        "let mut json = match value {".to_string(),
        "    dtogen_runtime::Value::Null => return Ok(None),".to_string(),
        "    dtogen_runtime::Value::Array(json) => json,".to_string(),
        format!("    other => return Err(dtogen_runtime::DecodeError::mismatch({}, \"array\", &other)),", name),
        "};".to_string(),
        "let mut dto = Self::default();".to_string(),
    ];
    for (offset, slot) in slots.iter().enumerate() {
        if let PropertySlot::Property(property) = slot {
            lines.push(format!("if let Some(v0) = json.get_mut({}).map(std::mem::take) {{", offset));
            push_assignment(ctx, iface, property, &mut lines);
        }
    }
    lines.push("Ok(Some(dto))".to_string());
    lines
}

/// Closes the `if let Some(v0) = ...` block opened by the caller.
fn push_assignment(ctx: &GenContext<'_>, iface: &SchemaInterface, property: &Property, lines: &mut Vec<String>) {
    lines.push(format!("    dto.{} = {};", field(property), decode_property(ctx, iface, property)));
    // Historical quirk: an absent nullable Boolean decodes as false, not None
    if storage(property) == Storage::Optional && property.ty == Type::Scalar(Scalar::Boolean) {
        lines.push("} else {".to_string());
        lines.push(format!("    dto.{} = Some(false);", field(property)));
    }
    lines.push("}".to_string());
}

/// Field value decoded from the owned wire value `v0`.
fn decode_property(ctx: &GenContext<'_>, iface: &SchemaInterface, property: &Property) -> String {
    let path = property_path(iface, property);
    let expansion = expand(&property.ty);
    let plain = storage(property) == Storage::Plain;
    let default = if plain { ".unwrap_or_default()" } else { "" };

    match &property.ty {
        Type::Scalar(Scalar::Number(kind)) => {
            format!("dtogen_runtime::decode_opt_number::<{}>(&v0, {})?{}", kind.rust_type(), path, default)
        }
        Type::Scalar(Scalar::Boolean) => format!("dtogen_runtime::decode_opt_bool(&v0, {})?{}", path, default),
        Type::Scalar(Scalar::String)  => format!("dtogen_runtime::decode_opt_string(v0, {})?", path),
        Type::Enum(name) => format!("dtogen_runtime::decode_opt_enum::<{}>(&v0, {})?", name, path),
        Type::Any => "dtogen_runtime::decode_opt_any(v0, copy_jsons)".to_string(),
        Type::Reference(_) => format!(
            "<{} as dtogen_runtime::JsonSerializable>::from_json_value_with(v0, copy_jsons)?.map(Box::new)",
            ctx.rust_type(&property.ty)
        ),
        Type::List(_) | Type::Map(_) => format!("{}?", decode_container(ctx, &expansion, 0, "v0", &path)),
    }
}

/// Element value decoded from the owned wire value `var`. Only a nested
/// container may be `null`, and reads as empty.
fn decode_layer(ctx: &GenContext<'_>, expansion: &TypeExpansion<'_>, depth: usize, var: &str, path: &str) -> String {
    let ty = expansion.at(depth);
    match ty {
        Type::Scalar(Scalar::Number(kind)) => {
            format!("dtogen_runtime::decode_number::<{}>(&{}, {})?", kind.rust_type(), var, path)
        }
        Type::Scalar(Scalar::Boolean) => format!("dtogen_runtime::decode_bool(&{}, {})?", var, path),
        Type::Scalar(Scalar::String)  => format!("dtogen_runtime::decode_string({}, {})?", var, path),
        Type::Enum(name) => format!("dtogen_runtime::decode_enum::<{}>(&{}, {})?", name, var, path),
        Type::Any => format!("dtogen_runtime::decode_any({}, copy_jsons)", var),
        Type::Reference(_) => format!(
            "dtogen_runtime::require(<{} as dtogen_runtime::JsonSerializable>::from_json_value_with({}, copy_jsons)?, {})?",
            ctx.rust_type(ty),
            var,
            path
        ),
        Type::List(_) | Type::Map(_) => {
            format!("{}?.unwrap_or_default()", decode_container(ctx, expansion, depth, var, path))
        }
    }
}

/// Call decoding the container at `depth`, yielding `Result<Option<C>, _>`.
fn decode_container(ctx: &GenContext<'_>, expansion: &TypeExpansion<'_>, depth: usize, var: &str, path: &str) -> String {
    let next = format!("v{}", depth + 1);
    let element = ctx.rust_type(expansion.at(depth + 1));
    let inner = decode_layer(ctx, expansion, depth + 1, &next, path);
    match expansion.kind(depth) {
        LayerKind::Map => format!(
            "dtogen_runtime::decode_map::<{}, {}, _>({}, {}, |{}| Ok({}))",
            ctx.rust_type(expansion.at(depth)),
            element,
            var,
            path,
            next,
            inner
        ),
        _ => format!(
            "dtogen_runtime::decode_list::<{}, _>({}, {}, |{}| Ok({}))",
            element, var, path, next, inner
        ),
    }
}
