//! dtogen
//!
//! Facade over the compiler and the runtime:
//!
//! - `compile_file` / `build_variants` for build scripts and tools
//! - the runtime traits and helpers linked by generated code
//! - the error types of both sides

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

pub use dtogen_compiler::{
    compile_schema_to_rust, generate, CodecGenError, DtoGenError, GeneratedModule, GeneratorConfig, SchemaError,
    SchemaSet, Variant,
};
pub use dtogen_runtime::{DecodeError, DtoHash, DtoRegistry, JsonSerializable, WireEnum};

/// Loads and validates the schema descriptor at `path`.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaSet, DtoGenError> {
    let text = fs::read_to_string(path)?;
    let source = dtogen_compiler::parse_schema_source(&text)?;
    Ok(dtogen_compiler::load_interfaces(&source)?)
}

/// Generates one variant of the schema at `path`. Fails on the first
/// interface that cannot be generated.
pub fn compile_file(
    path: impl AsRef<Path>,
    variant: Variant,
    config: &GeneratorConfig,
) -> Result<GeneratedModule, DtoGenError> {
    config.validate()?;
    let schema = load_schema(path)?;
    let module = generate(&schema, variant, config);
    if let Some(err) = module.failures.first() {
        return Err(err.clone().into());
    }
    Ok(module)
}

/// Writes `client_dtos.rs` and `server_dtos.rs` for the schema at
/// `schema_path` into `out_dir` and returns their paths.
///
/// ```rust,ignore
/// // build.rs
/// let out_dir = std::env::var("OUT_DIR").unwrap();
/// dtogen::build_variants("schema/demo.json", &out_dir, &dtogen::GeneratorConfig::new())?;
/// println!("cargo:rerun-if-changed=schema/demo.json");
/// ```
pub fn build_variants(
    schema_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>, DtoGenError> {
    config.validate()?;
    let schema = load_schema(schema_path)?;

    let mut written = Vec::new();
    for variant in [Variant::Client, Variant::Server] {
        let module = generate(&schema, variant, config);
        if let Some(err) = module.failures.into_iter().next() {
            return Err(err.into());
        }
        let path = out_dir.as_ref().join(format!("{}_dtos.rs", variant));
        fs::write(&path, &module.source)?;
        info!(%variant, file = %path.display(), "wrote generated module");
        written.push(path);
    }
    Ok(written)
}

pub mod compiler {
    pub use dtogen_compiler::*;
}

pub mod runtime {
    pub use dtogen_runtime::*;
}
