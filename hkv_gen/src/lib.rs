//! Generator for selective hash-field accessors.
//!
//! Schema documents flow through three stages, each in its own module:
//!
//! 1. [`schema::ir`] normalizes descriptors into one IR per package,
//! 2. [`resolve`] picks a storage strategy for every field,
//! 3. [`codegen`] renders one Rust source unit per package.
//!
//! [`generate`] runs all three and either returns every unit or fails
//! without output.

pub mod codegen;
pub mod config;
pub mod plugin;
pub mod resolve;
pub mod schema;

use codegen::{EmitError, GeneratedUnit, RustCodeGenerator, RustCodeGeneratorOptions};
use hkv_types::SchemaFile;
use resolve::{ResolveError, ResolvedSchema};
use schema::{SchemaBuilder, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
}

/// Builds and resolves every package found in `files`.
pub fn analyze(files: impl IntoIterator<Item = SchemaFile>) -> Result<Vec<ResolvedSchema>, GenerateError> {
    let mut builder = SchemaBuilder::new();
    for file in files {
        builder.add_file(file);
    }
    let units = builder.build()?;
    let resolved = units
        .iter()
        .map(resolve::resolve)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(resolved)
}

/// Renders one unit per package. Nothing is returned unless every unit renders.
pub fn generate(
    files: impl IntoIterator<Item = SchemaFile>,
    options: &RustCodeGeneratorOptions,
) -> Result<Vec<GeneratedUnit>, GenerateError> {
    let generator = RustCodeGenerator::new(options.clone());
    let units = analyze(files)?
        .iter()
        .map(|schema| generator.emit_unit(schema))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(units)
}
