//! Emits the struct of a DTO together with its accessors, mutators, deep
//! copy, equality, hash and delegate methods.
//!
//! List/Map properties are held as `Option<C>` and follow the ensure rule:
//! `get_x`, `add_x`/`put_x` and `clear_x` materialize an empty container
//! first, while equality and hash read an absent container as empty.

use crate::{
    codec::indent,
    context::{accessor_suffix, field, impl_name, storage, GenContext, Storage},
    expand::{expand, LayerKind, TypeExpansion},
    types::{Property, Scalar, SchemaInterface, Type},
    utils::escape_rust_keyword,
};

pub fn emit_declaration(ctx: &GenContext<'_>, iface: &SchemaInterface) -> String {
    let mut lines = vec![
        ctx.policy.marker(&iface.name),
        "#[derive(Debug, Default)]".to_string(),
        format!("pub struct {} {{", impl_name(&iface.name)),
    ];
    for property in ctx.schema.all_properties(iface) {
        lines.push(format!("    {}: {},", field(property), ctx.storage_type(property)));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

/// Inherent impl: constructor, accessors, mutators, `copy_of` and delegates.
pub fn emit_methods(ctx: &GenContext<'_>, iface: &SchemaInterface) -> String {
    let name = impl_name(&iface.name);
    let properties = ctx.schema.all_properties(iface);

    let mut methods: Vec<Vec<String>> = vec![vec![
        "pub fn new() -> Self {".to_string(),
        "    Self::default()".to_string(),
        "}".to_string(),
    ]];
    for property in &properties {
        methods.extend(accessors(ctx, property));
    }

    let origin = if properties.is_empty() { "_origin" } else { "origin" };
    let mut copy = vec![
        "/// Deep copy of `origin`.".to_string(),
        format!("pub fn copy_of({}: &Self) -> Self {{", origin),
        "    Self {".to_string(),
    ];
    for property in &properties {
        copy.push(format!("        {}: {},", field(property), copy_property(ctx, property, "origin")));
    }
    copy.push("    }".to_string());
    copy.push("}".to_string());
    methods.push(copy);

    for delegation in &iface.delegations {
        let params: Vec<String> = delegation
            .params
            .iter()
            .map(|param| format!(", {}: {}", escape_rust_keyword(&param.name), param.ty))
            .collect();
        let args: Vec<String> = delegation
            .params
            .iter()
            .map(|param| format!(", {}", escape_rust_keyword(&param.name)))
            .collect();
        let returns = delegation
            .returns
            .as_ref()
            .map(|ty| format!(" -> {}", ty))
            .unwrap_or_default();
        methods.push(vec![
            format!("pub fn {}(&self{}){} {{", escape_rust_keyword(&delegation.method), params.concat(), returns),
            format!("    {}(self{})", delegation.target, args.concat()),
            "}".to_string(),
        ]);
    }

    let mut lines = vec![format!("impl {} {{", name)];
    let body: Vec<String> = methods.join(&String::new());
    lines.extend(indent(body, 4));
    lines.push("}".to_string());
    lines.join("\n")
}

fn accessors(ctx: &GenContext<'_>, property: &Property) -> Vec<Vec<String>> {
    let field = field(property);
    let suffix = accessor_suffix(property);
    let inner = ctx.rust_type(&property.ty);

    match storage(property) {
        Storage::Plain => vec![
            vec![
                format!("pub fn get_{}(&self) -> {} {{", suffix, inner),
                format!("    self.{}", field),
                "}".to_string(),
            ],
            setter(&suffix, &field, &inner, "v"),
            with(&suffix, &field, &inner, "v"),
        ],
        Storage::Optional => {
            let getter = match &property.ty {
                Type::Scalar(Scalar::String) => vec![
                    format!("pub fn get_{}(&self) -> Option<&str> {{", suffix),
                    format!("    self.{}.as_deref()", field),
                    "}".to_string(),
                ],
                Type::Any => vec![
                    format!("pub fn get_{}(&self) -> Option<&dtogen_runtime::Value> {{", suffix),
                    format!("    self.{}.as_ref()", field),
                    "}".to_string(),
                ],
                _ => vec![
                    format!("pub fn get_{}(&self) -> Option<{}> {{", suffix, inner),
                    format!("    self.{}", field),
                    "}".to_string(),
                ],
            };
            let optional = format!("Option<{}>", inner);
            let (set_x, with_x) = match &property.ty {
                Type::Scalar(Scalar::String) => (
                    setter(&suffix, &field, &optional, "v"),
                    with(&suffix, &field, "impl Into<String>", "Some(v.into())"),
                ),
                // A JSON null is held as None so it survives the wire unchanged
                Type::Any => (
                    setter(&suffix, &field, &optional, "v.filter(|v| !v.is_null())"),
                    with(&suffix, &field, &inner, "Some(v).filter(|v| !v.is_null())"),
                ),
                _ => (
                    setter(&suffix, &field, &optional, "v"),
                    with(&suffix, &field, &inner, "Some(v)"),
                ),
            };
            vec![getter, set_x, with_x]
        }
        Storage::Boxed => vec![
            vec![
                format!("pub fn get_{}(&self) -> Option<&{}> {{", suffix, inner),
                format!("    self.{}.as_deref()", field),
                "}".to_string(),
            ],
            setter(&suffix, &field, &format!("Option<{}>", inner), "v.map(Box::new)"),
            with(&suffix, &field, &inner, "Some(Box::new(v))"),
        ],
        Storage::Container => {
            let expansion = expand(&property.ty);
            let element = ctx.rust_type(expansion.at(1));
            let insert = if expansion.kind(0) == LayerKind::Map {
                vec![
                    format!("pub fn put_{}(&mut self, k: impl Into<String>, v: {}) {{", suffix, element),
                    format!("    self.ensure_{}().insert(k.into(), v);", suffix),
                    "}".to_string(),
                ]
            } else {
                vec![
                    format!("pub fn add_{}(&mut self, v: {}) {{", suffix, element),
                    format!("    self.ensure_{}().push(v);", suffix),
                    "}".to_string(),
                ]
            };
            vec![
                vec![
                    format!("pub fn ensure_{}(&mut self) -> &mut {} {{", suffix, inner),
                    format!("    self.{}.get_or_insert_with(Default::default)", field),
                    "}".to_string(),
                ],
                vec![
                    format!("pub fn get_{}(&mut self) -> &mut {} {{", suffix, inner),
                    format!("    self.ensure_{}()", suffix),
                    "}".to_string(),
                ],
                setter(&suffix, &field, &inner, "Some(v)"),
                with(&suffix, &field, &inner, "Some(v)"),
                insert,
                vec![
                    format!("pub fn clear_{}(&mut self) {{", suffix),
                    format!("    self.ensure_{}().clear();", suffix),
                    "}".to_string(),
                ],
            ]
        }
    }
}

fn setter(suffix: &str, field: &str, ty: &str, value: &str) -> Vec<String> {
    vec![
        format!("pub fn set_{}(&mut self, v: {}) {{", suffix, ty),
        format!("    self.{} = {};", field, value),
        "}".to_string(),
    ]
}

fn with(suffix: &str, field: &str, ty: &str, value: &str) -> Vec<String> {
    vec![
        format!("pub fn with_{}(mut self, v: {}) -> Self {{", suffix, ty),
        format!("    self.{} = {};", field, value),
        "    self".to_string(),
        "}".to_string(),
    ]
}

/// Independent copy of `<source>.<field>`.
pub fn copy_property(ctx: &GenContext<'_>, property: &Property, source: &str) -> String {
    let place = format!("{}.{}", source, field(property));
    let expansion = expand(&property.ty);
    match (storage(property), &property.ty) {
        (Storage::Plain, _) => place,
        (Storage::Optional, Type::Scalar(Scalar::String)) => format!("{}.clone()", place),
        (Storage::Optional, Type::Any) => format!("{}.as_ref().map(dtogen_runtime::copy_json)", place),
        (Storage::Optional, _) => place,
        (Storage::Boxed, Type::Reference(name)) if ctx.is_external(name) => format!("{}.clone()", place),
        (Storage::Boxed, _) => format!(
            "{}.as_ref().map(|v0| Box::new({}::copy_of(v0)))",
            place,
            ctx.rust_type(&property.ty)
        ),
        (Storage::Container, _) => format!("{}.as_ref().map(|v0| {})", place, copy_layer(ctx, &expansion, 0, "v0")),
    }
}

/// Copy of the layer at `depth`, borrowed as `var`.
fn copy_layer(ctx: &GenContext<'_>, expansion: &TypeExpansion<'_>, depth: usize, var: &str) -> String {
    let next = format!("v{}", depth + 1);
    let ty = expansion.at(depth);
    match ty {
        Type::Scalar(Scalar::String) => format!("{}.clone()", var),
        Type::Scalar(_) | Type::Enum(_) => format!("*{}", var),
        Type::Any => format!("dtogen_runtime::copy_json({})", var),
        Type::Reference(name) if ctx.is_external(name) => format!("{}.clone()", var),
        Type::Reference(_) => format!("{}::copy_of({})", ctx.rust_type(ty), var),
        Type::List(_) => format!(
            "{}.iter().map(|{}| {}).collect::<{}>()",
            var,
            next,
            copy_layer(ctx, expansion, depth + 1, &next),
            ctx.rust_type(ty)
        ),
        Type::Map(_) => format!(
            "{}.iter().map(|(k{}, {})| (k{}.clone(), {})).collect::<{}>()",
            var,
            depth,
            next,
            depth,
            copy_layer(ctx, expansion, depth + 1, &next),
            ctx.rust_type(ty)
        ),
    }
}

/// `PartialEq`, `DtoHash`, `Hash` and `Clone` impls, plus an upcasting
/// `From<&Self>` for every ancestor whose properties keep their types.
pub fn emit_structural(ctx: &GenContext<'_>, iface: &SchemaInterface) -> String {
    let name = impl_name(&iface.name);
    let properties = ctx.schema.all_properties(iface);
    let mut lines = Vec::new();

    // 1) Equality, reading absent containers as empty
    let comparisons: Vec<String> = properties
        .iter()
        .map(|property| match storage(property) {
            Storage::Container => format!("dtogen_runtime::ensured_eq(&self.{0}, &other.{0})", field(property)),
            _ => format!("self.{0} == other.{0}", field(property)),
        })
        .collect();
    let other = if comparisons.is_empty() { "_other" } else { "other" };
    lines.push(format!("impl PartialEq for {} {{", name));
    lines.push(format!("    fn eq(&self, {}: &Self) -> bool {{", other));
    if comparisons.is_empty() {
        lines.push("        true".to_string());
    } else {
        lines.push(format!("        {}", comparisons.join("\n            && ")));
    }
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    // 2) Hash, seeded and accumulated like the wire-compatible implementations
    lines.push(format!("impl dtogen_runtime::DtoHash for {} {{", name));
    lines.push("    fn dto_hash(&self) -> i32 {".to_string());
    if properties.is_empty() {
        lines.push("        dtogen_runtime::HASH_SEED".to_string());
    } else {
        lines.push("        let mut hash = dtogen_runtime::HASH_SEED;".to_string());
        for property in &properties {
            let property_hash = match storage(property) {
                Storage::Container => format!("dtogen_runtime::ensured_hash(&self.{})", field(property)),
                _ => format!("self.{}.dto_hash()", field(property)),
            };
            lines.push(format!("        hash = dtogen_runtime::hash_step(hash, {});", property_hash));
        }
        lines.push("        hash".to_string());
    }
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("impl std::hash::Hash for {} {{", name));
    lines.push("    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {".to_string());
    lines.push("        state.write_i32(dtogen_runtime::DtoHash::dto_hash(self));".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    // 3) Clone is the deep copy
    lines.push(format!("impl Clone for {} {{", name));
    lines.push("    fn clone(&self) -> Self {".to_string());
    lines.push("        Self::copy_of(self)".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    // 4) Upcasts
    for ancestor in ctx.schema.ancestors(iface) {
        if ctx.is_external(&ancestor.name) || ctx.check_interface(ancestor).is_err() {
            continue;
        }
        let inherited = ctx.schema.all_properties(ancestor);
        let unchanged = inherited.iter().all(|property| {
            properties
                .iter()
                .any(|own| own.name == property.name && own.ty == property.ty && own.nullable == property.nullable)
        });
        if !unchanged {
            continue;
        }

        let parent = impl_name(&ancestor.name);
        lines.push(String::new());
        lines.push(format!("impl From<&{}> for {} {{", name, parent));
        lines.push(format!("    fn from(origin: &{}) -> Self {{", name));
        lines.push(format!("        {} {{", parent));
        for property in &inherited {
            lines.push(format!("            {}: {},", field(property), copy_property(ctx, property, "origin")));
        }
        lines.push("        }".to_string());
        lines.push("    }".to_string());
        lines.push("}".to_string());
    }

    lines.join("\n")
}
