/* Common utilities shared between analyze and codegen commands */

use anyhow::Context;
use hkv_gen::schema::{load_descriptor_set, load_schema_file};
use hkv_types::SchemaFile;
use std::path::PathBuf;

/* Where schema documents come from */
pub struct SchemaInputs {
  pub files: Vec<PathBuf>,
  pub descriptor_sets: Vec<PathBuf>,
}

/* Load every YAML file and descriptor set, in the order given */
pub fn load_schemas(inputs: &SchemaInputs, verbose: bool) -> anyhow::Result<Vec<SchemaFile>> {
  if inputs.files.is_empty() && inputs.descriptor_sets.is_empty() {
    anyhow::bail!("no schema input: pass --files or --descriptor-set");
  }

  let mut schemas = Vec::new();
  for path in &inputs.files {
    let schema = load_schema_file(path)?;
    if verbose {
      println!(
        "  - {} (package {}, {} message(s), {} enum(s))",
        path.display(),
        schema.schema.package,
        schema.messages.len(),
        schema.enums.len()
      );
    }
    schemas.push(schema);
  }
  for path in &inputs.descriptor_sets {
    let files = load_descriptor_set(path)
      .with_context(|| format!("loading descriptor set {}", path.display()))?;
    if verbose {
      println!("  - {} ({} proto file(s))", path.display(), files.len());
    }
    schemas.extend(files);
  }
  Ok(schemas)
}
