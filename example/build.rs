use dtogen::GeneratorConfig;
use std::env;
use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut config = GeneratorConfig::new();
    config.set_header(
        "Generated DTOs for dtogen-example\n\
         Source: schema/demo.json",
    );
    config
        .load_overrides(manifest_dir.join("schema/overrides.json"))
        .expect("Failed to load overrides");

    // Writes client_dtos.rs and server_dtos.rs
    dtogen::build_variants(manifest_dir.join("schema/demo.json"), &out_dir, &config)
        .expect("Failed to generate DTOs");

    println!("cargo:rerun-if-changed=schema/demo.json");
    println!("cargo:rerun-if-changed=schema/overrides.json");
    println!("cargo:rerun-if-changed=build.rs");
}
