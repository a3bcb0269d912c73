//! dtogen-compiler
//!
//! This crate implements:
//!  1) A loader for JSON schema descriptors, with a tokenizer + parser for
//!     type expressions such as `Map<List<User>>`,
//!  2) A schema verifier (inheritance cycles, duplicate properties, compact indices),
//!  3) The type expander shared by every emitter,
//!  4) Code generation of client and server DTO implementations
//!     (`generate` → `GeneratedModule`, `compile_schema_to_rust` → `String`),
//!  5) Error types (`SchemaError`, `CodecGenError`, `DtoGenError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod loader;
pub mod verifier;
pub mod expand;
pub mod policy;
pub mod context;
pub mod codec;
pub mod structural;
pub mod registry;
pub mod gen_rust;

pub use error::{CodecGenError, DtoGenError, SchemaError};
pub use expand::{expand, TypeExpansion};
pub use gen_rust::{compile_schema_to_rust, generate, GeneratedModule, GeneratorConfig};
pub use loader::{load_interfaces, parse_schema_source, SchemaSource};
pub use types::{GeneratedImplementation, SchemaSet, Type, Variant};
