//! XSD 1.0 schema to Rust data structures, validating loader, and writer
//! (components A-J).
//!
//! Parses an XSD file into the schema oracle ([`xsd`]), annotates it into
//! a Rust-shaped graph ([`annotate`], backed by [`registry`]), compiles
//! choice/sequence content models into DFAs ([`dfa`]), and emits the
//! generated module text ([`codegen`]).

pub mod annotate;
pub mod codegen;
pub mod dfa;
pub mod error;
pub mod mangle;
pub mod registry;
pub mod xsd;

use std::path::Path;

use error::SchemaResult;

/// Reads and generates Rust source for the XSD schema at `path`, wrapped
/// in a module named after the schema file's basename.
pub fn generate_from_path(path: &Path) -> anyhow::Result<String> {
    let schema = xsd::parse_xsd(path)?;
    let namespace = mangle::namespace_from_filename(path);
    Ok(generate(&schema, &namespace)?)
}

/// Generates Rust source for an already-parsed schema under the given
/// module namespace.
pub fn generate(schema: &xsd::Schema, namespace: &str) -> SchemaResult<String> {
    codegen::driver::generate(schema, namespace)
}
