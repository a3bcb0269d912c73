use crate::utils::rust_str;

/// One interface served by the generated registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub interface: String,
    /// Rust path of the implementing type, generated or overridden.
    pub type_path: String,
}

/// Emits `pub fn registry()`, mapping interface names to providers that
/// create, decode and copy instances of the implementing type.
pub fn emit_registry(entries: &[RegistryEntry]) -> String {
    let mut lines = vec![
        "/// Providers for every DTO of this module, keyed by interface name.".to_string(),
        "pub fn registry() -> dtogen_runtime::DtoRegistry {".to_string(),
    ];
    if entries.is_empty() {
        lines.push("    dtogen_runtime::DtoRegistry::new()".to_string());
    } else {
        lines.push("    let mut registry = dtogen_runtime::DtoRegistry::new();".to_string());
        for entry in entries {
            lines.push(format!(
                "    registry.register(dtogen_runtime::TypedProvider::<{}>::new({}, {}));",
                entry.type_path,
                rust_str(&entry.interface),
                rust_str(&entry.type_path)
            ));
        }
        lines.push("    registry".to_string());
    }
    lines.push("}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_each_entry() {
        let code = emit_registry(&[
            RegistryEntry { interface: "User".into(), type_path: "UserImpl".into() },
            RegistryEntry { interface: "Legacy".into(), type_path: "crate::legacy::Legacy".into() },
        ]);
        assert!(code.contains("    let mut registry = dtogen_runtime::DtoRegistry::new();"));
        assert!(code.contains(
            "    registry.register(dtogen_runtime::TypedProvider::<UserImpl>::new(\"User\", \"UserImpl\"));"
        ));
        assert!(code.contains(
            "TypedProvider::<crate::legacy::Legacy>::new(\"Legacy\", \"crate::legacy::Legacy\")"
        ));
        assert!(code.ends_with("    registry\n}"));
    }

    #[test]
    fn empty_registry_is_returned_directly() {
        let code = emit_registry(&[]);
        assert!(code.contains("    dtogen_runtime::DtoRegistry::new()\n}"));
        assert!(!code.contains("let mut"));
    }
}
