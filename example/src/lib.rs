//! DTOs generated from `schema/demo.json`, in both variants.
//!
//! `LegacyNote` is declared by the schema but implemented by hand in
//! [`legacy`]; the generated modules reference it through the override table
//! in `schema/overrides.json`.

pub mod legacy;
pub mod support;

pub mod client {
    include!(concat!(env!("OUT_DIR"), "/client_dtos.rs"));
}

pub mod server {
    include!(concat!(env!("OUT_DIR"), "/server_dtos.rs"));
}
