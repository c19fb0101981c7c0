/* Codegen command - generate accessor units from schema documents */

use super::common::{load_schemas, SchemaInputs};
use hkv_gen::codegen::RustCodeGeneratorOptions;
use std::path::Path;
use tracing::info;

/* Execute the codegen command */
pub fn run(
  inputs: &SchemaInputs,
  options: &RustCodeGeneratorOptions,
  output_dir: &Path,
  verbose: bool,
) -> anyhow::Result<()> {
  if verbose {
    println!("HKV Generator - Code Generation Tool");
    println!("====================================\n");
    println!("[~] Configuration:");
    println!("  Output directory: {}", output_dir.display());
    println!("  Runtime crate: {}", options.runtime_crate);
    println!("  File suffix: {}", options.file_suffix);
    println!("  Input files: {}", inputs.files.len() + inputs.descriptor_sets.len());
    println!();
    println!("[~] Loading schemas...");
  }

  let schemas = load_schemas(inputs, verbose)?;

  if verbose {
    println!("\n[~] Resolving storage strategies and emitting units...");
  }
  /* Everything renders before anything is written */
  let units = hkv_gen::generate(schemas, options)?;

  std::fs::create_dir_all(output_dir)?;
  for unit in &units {
    let path = output_dir.join(&unit.file_name);
    std::fs::write(&path, &unit.content)?;
    info!(package = %unit.package, path = %path.display(), "wrote unit");
    if verbose {
      println!("  - {} -> {}", unit.package, path.display());
    }
  }

  if verbose {
    println!("\n[✓] Generated {} unit(s) in {}", units.len(), output_dir.display());
  }
  Ok(())
}
