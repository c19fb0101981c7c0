use anyhow::Context;
use hkv_gen::codegen::RustCodeGeneratorOptions;
use hkv_gen::schema::load_schema_file;
use std::{env, fs, path::PathBuf};

fn main() -> anyhow::Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let schema_path = manifest_dir.join("schema").join("game.yaml");
    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed=build.rs");

    let schema = load_schema_file(&schema_path)?;
    let units = hkv_gen::generate(vec![schema], &RustCodeGeneratorOptions::default())
        .with_context(|| format!("generating accessors for {}", schema_path.display()))?;
    for unit in units {
        fs::write(out_dir.join(&unit.file_name), unit.content)?;
    }
    Ok(())
}
