/* Analyze command - show how every field will be stored */

use super::common::{load_schemas, SchemaInputs};
use hkv_gen::resolve::ResolvedSchema;

pub fn run(inputs: &SchemaInputs, json: bool) -> anyhow::Result<()> {
  let schemas = load_schemas(inputs, false)?;
  let resolved = hkv_gen::analyze(schemas)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    return Ok(());
  }
  for schema in &resolved {
    print_schema(schema);
  }
  Ok(())
}

fn print_schema(schema: &ResolvedSchema) {
  println!("[~] Package {}", schema.package);
  println!("==============================");

  let mut caps = Vec::new();
  if schema.capabilities.numeric_parse {
    caps.push("numeric-parse");
  }
  if schema.capabilities.generic_codec {
    caps.push("generic-codec");
  }
  if caps.is_empty() {
    println!("  Capabilities: none");
  } else {
    println!("  Capabilities: {}", caps.join(", "));
  }

  if !schema.enums.is_empty() {
    println!("\n  Enums:");
    for info in &schema.enums {
      let values: Vec<String> = info
        .values
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
      println!("    {} {{ {} }}", info.name, values.join(", "));
    }
  }

  for message in &schema.messages {
    println!("\n  Message {} ({} field(s))", message.name, message.fields.len());
    for field in &message.fields {
      println!(
        "    [{:>3}] {:<20} {:<9} {:<8} {:<16} {:<32} {}{}",
        field.tag,
        field.name,
        field.cardinality.to_string(),
        field.kind.to_string(),
        field.strategy.to_string(),
        field.native_type.to_string(),
        field.capability,
        if field.boxed { " (boxed)" } else { "" }
      );
    }
  }
  println!();
}
