//! Driver turning a validated [`SchemaSet`] into one Rust module per variant.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    codec::{emit_codec, indent},
    context::{impl_name, GenContext},
    error::{CodecGenError, DtoGenError, SchemaError},
    loader::{load_interfaces, parse_schema_source, IDENTIFIER, RUST_PATH},
    policy::policy_for,
    registry::{emit_registry, RegistryEntry},
    structural::{emit_declaration, emit_methods, emit_structural},
    types::{EnumDef, GeneratedImplementation, SchemaInterface, SchemaSet, Variant},
    utils::{escape_rust_keyword, rust_str, to_pascal_case},
};

/// Options shared by both variant runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorConfig {
    /// Replaces the default "Auto-generated" header comment.
    pub header:      Option<String>,
    /// Wraps the output in `pub mod {name}`; defaults to the schema package.
    pub module_name: Option<String>,
    /// Interface name -> Rust path of a type implementing it outside the
    /// generated module.
    pub overrides:   BTreeMap<String, String>,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.header = Some(header.into());
        self
    }

    pub fn set_module_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn add_override(&mut self, interface: impl Into<String>, path: impl Into<String>) -> &mut Self {
        self.overrides.insert(interface.into(), path.into());
        self
    }

    /// Merges a JSON override table `{ "Interface": "path::to::Type" }`.
    pub fn load_overrides(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, DtoGenError> {
        let text = fs::read_to_string(path.as_ref())?;
        let table: BTreeMap<String, String> = serde_json::from_str(&text)?;
        debug!(file = %path.as_ref().display(), count = table.len(), "loaded overrides");
        self.overrides.extend(table);
        self.validate()?;
        Ok(self)
    }

    /// Checks that every override names a Rust type path and that the module
    /// name is an identifier.
    pub fn validate(&self) -> Result<(), DtoGenError> {
        for (interface, path) in &self.overrides {
            if !RUST_PATH.is_match(path) {
                return Err(DtoGenError::InvalidOverride {
                    interface: interface.clone(),
                    path:      path.clone(),
                });
            }
        }
        if let Some(name) = &self.module_name {
            if !IDENTIFIER.is_match(name) {
                return Err(SchemaError::InvalidIdentifier {
                    kind: "module",
                    name: name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Output of one variant run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedModule {
    pub variant:         Variant,
    /// Complete module source.
    pub source:          String,
    pub implementations: Vec<GeneratedImplementation>,
    /// Interfaces that could not be generated; they are absent from `source`.
    pub failures:        Vec<CodecGenError>,
}

impl GeneratedModule {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, &self.source)
    }
}

/// Declaration, methods, codec and structural impls of one interface.
pub fn generate_implementation(
    ctx: &GenContext<'_>,
    iface: &SchemaInterface,
) -> Result<GeneratedImplementation, CodecGenError> {
    let codec = emit_codec(ctx, iface)?;
    Ok(GeneratedImplementation {
        interface: iface.name.clone(),
        impl_name: impl_name(&iface.name),
        variant: ctx.policy.variant(),
        declaration: emit_declaration(ctx, iface),
        methods: emit_methods(ctx, iface),
        codec,
        structural: emit_structural(ctx, iface),
    })
}

/// Emits a schema enum with its wire names and hash.
pub fn emit_enum(enum_def: &EnumDef) -> String {
    let name = &enum_def.name;
    let variants: Vec<(String, &String)> = enum_def
        .constants
        .iter()
        .map(|constant| (escape_rust_keyword(&to_pascal_case(constant)), constant))
        .collect();

    let mut lines = vec![
        "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]".to_string(),
        format!("pub enum {} {{", name),
    ];
    for (variant, _) in &variants {
        lines.push(format!("    {},", variant));
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("impl dtogen_runtime::WireEnum for {} {{", name));
    lines.push(format!("    const ENUM_NAME: &'static str = {};", rust_str(name)));
    lines.push(String::new());
    lines.push("    fn name(&self) -> &'static str {".to_string());
    lines.push("        match self {".to_string());
    for (variant, constant) in &variants {
        lines.push(format!("            {}::{} => {},", name, variant, rust_str(constant)));
    }
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push("    fn from_name(name: &str) -> Option<Self> {".to_string());
    lines.push("        match name {".to_string());
    for (variant, constant) in &variants {
        lines.push(format!("            {} => Some({}::{}),", rust_str(constant), name, variant));
    }
    lines.push("            _ => None,".to_string());
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("impl dtogen_runtime::DtoHash for {} {{", name));
    lines.push("    fn dto_hash(&self) -> i32 {".to_string());
    lines.push("        dtogen_runtime::DtoHash::dto_hash(dtogen_runtime::WireEnum::name(self))".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    lines.join("\n")
}

/// Generates the module of `variant`. Interfaces whose types cannot be
/// expressed are reported in `failures` and left out, registry included.
pub fn generate(schema: &SchemaSet, variant: Variant, config: &GeneratorConfig) -> GeneratedModule {
    let mut ctx = GenContext::new(schema, policy_for(variant), &config.overrides);
    ctx.exclude_failing();

    let mut fragments = vec![
        "#[allow(unused_imports)]\nuse dtogen_runtime::{DtoHash as _, JsonSerializable as _};".to_string(),
    ];
    for enum_def in &schema.enums {
        fragments.push(emit_enum(enum_def));
    }

    let mut implementations = Vec::new();
    let mut failures = Vec::new();
    let mut entries = Vec::new();

    for iface in &schema.interfaces {
        if let Some(path) = config.overrides.get(&iface.name) {
            debug!(interface = %iface.name, path = %path, "interface overridden");
            entries.push(RegistryEntry { interface: iface.name.clone(), type_path: path.clone() });
            continue;
        }
        match generate_implementation(&ctx, iface) {
            Ok(implementation) => {
                debug!(interface = %iface.name, %variant, "generated implementation");
                entries.push(RegistryEntry {
                    interface: iface.name.clone(),
                    type_path: implementation.impl_name.clone(),
                });
                fragments.push(implementation.source());
                implementations.push(implementation);
            }
            Err(err) => {
                warn!(interface = %iface.name, %variant, error = %err, "skipping interface");
                failures.push(err);
            }
        }
    }

    for external in &schema.externals {
        if let Some(path) = config.overrides.get(external) {
            entries.push(RegistryEntry { interface: external.clone(), type_path: path.clone() });
        }
    }
    for name in config.overrides.keys() {
        if schema.interface(name).is_none() && !schema.externals.contains(name) {
            warn!(interface = %name, "override names no interface of the schema");
        }
    }

    fragments.push(emit_registry(&entries));

    let header = match &config.header {
        Some(text) => text.lines().map(|line| format!("// {}", line)).collect::<Vec<_>>().join("\n"),
        None => format!("// Auto-generated by dtogen ({} variant). DO NOT EDIT MANUALLY.", variant),
    };
    let body = fragments.join("\n\n");
    let module_name = config.module_name.as_ref().or(schema.package.as_ref());
    let source = match module_name {
        Some(name) => {
            let lines: Vec<String> = body.lines().map(str::to_string).collect();
            format!("{}\n\npub mod {} {{\n{}\n}}\n", header, name, indent(lines, 4).join("\n"))
        }
        None => format!("{}\n\n{}\n", header, body),
    };

    info!(
        %variant,
        generated = implementations.len(),
        failed = failures.len(),
        "generated module"
    );

    GeneratedModule {
        variant,
        source,
        implementations,
        failures,
    }
}

/// Descriptor text -> Rust source of one variant, failing on the first
/// interface that cannot be generated.
pub fn compile_schema_to_rust(text: &str, variant: Variant, config: &GeneratorConfig) -> Result<String, DtoGenError> {
    config.validate()?;
    let source = parse_schema_source(text)?;
    let schema = load_interfaces(&source)?;
    let module = generate(&schema, variant, config);
    if let Some(err) = module.failures.into_iter().next() {
        return Err(err.into());
    }
    Ok(module.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    const SCHEMA: &str = r#"{
        "enums": [{ "name": "Role", "constants": ["ADMIN", "self"] }],
        "externals": ["Legacy"],
        "interfaces": [
            { "name": "User", "properties": [
                { "name": "role", "type": "Role" },
                { "name": "legacy", "type": "Legacy" }
            ] },
            { "name": "Group", "properties": [{ "name": "members", "type": "List<User>" }] }
        ]
    }"#;

    #[test]
    fn emits_enum_with_wire_names() {
        let code = emit_enum(&EnumDef { name: "Role".into(), constants: vec!["ADMIN".into(), "self".into()] });
        assert!(code.contains("pub enum Role {\n    Admin,\n    Self_,\n}"));
        assert!(code.contains("            Role::Admin => \"ADMIN\","));
        assert!(code.contains("            \"self\" => Some(Role::Self_),"));
        assert!(code.contains("const ENUM_NAME: &'static str = \"Role\";"));
    }

    /// Every `XImpl` named in `source` is declared in it.
    fn assert_impls_declared(source: &str) {
        let impl_ref = Regex::new(r"\b([A-Z][A-Za-z0-9_]*Impl)\b").unwrap();
        for found in impl_ref.captures_iter(source) {
            let declaration = format!("pub struct {}", &found[1]);
            assert!(source.contains(&declaration), "{} is used but not declared", &found[1]);
        }
    }

    #[test]
    fn missing_override_skips_the_interface_and_its_users() {
        let schema = load_interfaces(&parse_schema_source(SCHEMA).unwrap()).unwrap();
        let module = generate(&schema, Variant::Client, &GeneratorConfig::new());

        assert!(!module.is_complete());
        let failed: Vec<&str> = module
            .failures
            .iter()
            .map(|err| match err {
                CodecGenError::UnsupportedType { interface, .. } => interface.as_str(),
            })
            .collect();
        assert_eq!(failed, vec!["User", "Group"]);
        match &module.failures[1] {
            CodecGenError::UnsupportedType { property, type_name, .. } => {
                assert_eq!(property, "members");
                assert_eq!(type_name, "List<User>");
            }
        }
        assert!(!module.source.contains("UserImpl"));
        assert!(!module.source.contains("GroupImpl"));
        assert_impls_declared(&module.source);

        let err = compile_schema_to_rust(SCHEMA, Variant::Client, &GeneratorConfig::new()).unwrap_err();
        assert!(matches!(err, DtoGenError::Codec(CodecGenError::UnsupportedType { .. })));
    }

    #[test]
    fn generated_impls_are_self_contained() {
        let text = r#"{
            "externals": ["Legacy"],
            "interfaces": [
                { "name": "Base", "properties": [{ "name": "legacy", "type": "Legacy" }] },
                { "name": "Derived", "extends": "Base" },
                { "name": "Holder", "properties": [{ "name": "items", "type": "Map<List<Derived>>" }] },
                { "name": "Leaf", "properties": [{ "name": "n", "type": "int" }] },
                { "name": "Tree", "properties": [
                    { "name": "leaf", "type": "Leaf" },
                    { "name": "children", "type": "List<Tree>" }
                ] }
            ]
        }"#;
        let schema = load_interfaces(&parse_schema_source(text).unwrap()).unwrap();
        for variant in [Variant::Client, Variant::Server] {
            let module = generate(&schema, variant, &GeneratorConfig::new());
            assert_eq!(module.failures.len(), 3);
            let generated: Vec<&str> = module.implementations.iter().map(|i| i.interface.as_str()).collect();
            assert_eq!(generated, vec!["Leaf", "Tree"]);
            assert_impls_declared(&module.source);
        }

        let mut config = GeneratorConfig::new();
        config.add_override("Legacy", "crate::legacy::Legacy");
        let module = generate(&schema, Variant::Client, &config);
        assert!(module.is_complete());
        assert_impls_declared(&module.source);
    }

    #[test]
    fn overrides_are_registered_and_referenced() {
        let mut config = GeneratorConfig::new();
        config.add_override("Legacy", "crate::legacy::Legacy").set_module_name("model");
        let source = compile_schema_to_rust(SCHEMA, Variant::Server, &config).unwrap();

        assert!(source.starts_with("// Auto-generated by dtogen (server variant). DO NOT EDIT MANUALLY.\n\npub mod model {"));
        assert!(source.contains("    pub struct UserImpl {"));
        assert!(source.contains("legacy: Option<Box<crate::legacy::Legacy>>,"));
        assert!(source.contains("TypedProvider::<crate::legacy::Legacy>::new(\"Legacy\", \"crate::legacy::Legacy\")"));
        assert!(source.contains("TypedProvider::<GroupImpl>::new(\"Group\", \"GroupImpl\")"));
    }

    #[test]
    fn overridden_interface_is_not_generated() {
        let mut config = GeneratorConfig::new();
        config.add_override("Legacy", "crate::legacy::Legacy").add_override("User", "crate::user::User");
        let source = compile_schema_to_rust(SCHEMA, Variant::Client, &config).unwrap();

        assert!(!source.contains("pub struct UserImpl"));
        assert!(source.contains("members: Option<Vec<crate::user::User>>,"));
        assert!(source.contains("TypedProvider::<crate::user::User>::new(\"User\", \"crate::user::User\")"));
    }

    #[test]
    fn rejects_override_that_is_not_a_path() {
        let mut config = GeneratorConfig::new();
        config.add_override("Legacy", "not a path");
        let err = compile_schema_to_rust(SCHEMA, Variant::Client, &config).unwrap_err();
        assert!(matches!(err, DtoGenError::InvalidOverride { .. }));
    }

    #[test]
    fn custom_header_is_commented() {
        let mut config = GeneratorConfig::new();
        config.add_override("Legacy", "crate::legacy::Legacy").set_header("Generated for tests\nkeep out");
        let source = compile_schema_to_rust(SCHEMA, Variant::Client, &config).unwrap();
        assert!(source.starts_with("// Generated for tests\n// keep out\n\n#[allow(unused_imports)]"));
    }
}
