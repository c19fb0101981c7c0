use crate::codegen::rust_gen::{
  emit_enum, emit_record_impl, emit_selector, emit_struct, helpers, EmitError, MessagePlan,
};
use crate::resolve::{DirectEncoding, ResolvedSchema, StorageStrategy};
use tracing::debug;

pub const DEFAULT_RUNTIME_CRATE: &str = "::hkv_runtime";
pub const DEFAULT_FILE_SUFFIX: &str = ".hkv.rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustCodeGeneratorOptions {
  /* Path emitted code uses to reach the runtime crate */
  pub runtime_crate: String,
  pub file_suffix: String,
}

impl Default for RustCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
      file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
    }
  }
}

/// One rendered source file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
  pub package: String,
  pub file_name: String,
  pub content: String,
}

pub struct RustCodeGenerator {
  options: RustCodeGeneratorOptions,
}

impl RustCodeGenerator {
  pub fn new(options: RustCodeGeneratorOptions) -> Self {
    Self { options }
  }

  pub fn file_name(&self, package: &str) -> String {
    format!("{}{}", package.replace('.', "_"), self.options.file_suffix)
  }

  pub fn emit_unit(&self, schema: &ResolvedSchema) -> Result<GeneratedUnit, EmitError> {
    let runtime = self.options.runtime_crate.trim_end_matches("::");
    let capabilities = schema.capabilities;

    /* Every type emitted into the unit shares one namespace */
    let mut type_names = helpers::IdentScope::new(format!("package {}", schema.package));
    let mut enum_sources = Vec::with_capacity(schema.enums.len());
    for info in &schema.enums {
      let source = emit_enum(info)?;
      type_names.claim(&info.name, helpers::type_ident(&info.name))?;
      enum_sources.push(source);
    }
    let mut plans = Vec::with_capacity(schema.messages.len());
    for message in &schema.messages {
      let plan = MessagePlan::new(message)?;
      type_names.claim(&message.name, plan.type_ident.clone())?;
      type_names.claim(
        &format!("{} selectors", message.name),
        plan.selector_ident.clone(),
      )?;
      plans.push(plan);
    }

    let needs_plain = schema.messages.iter().flat_map(|m| &m.fields).any(|f| {
      matches!(
        f.strategy,
        StorageStrategy::Direct(DirectEncoding::Bool | DirectEncoding::Text | DirectEncoding::Bytes)
      )
    });

    let mut out = String::new();
    out.push_str(&format!(
      "// @generated by hkv-gen from package `{}`. Do not edit.\n",
      schema.package
    ));
    let mut declared = Vec::new();
    if capabilities.numeric_parse {
      declared.push("numeric-parse");
    }
    if capabilities.generic_codec {
      declared.push("generic-codec");
    }
    if !declared.is_empty() {
      out.push_str(&format!("// Capabilities: {}.\n", declared.join(", ")));
    }
    out.push('\n');

    if capabilities.numeric_parse {
      out.push_str(&format!("use {}::codec::numeric;\n", runtime));
    }
    if capabilities.generic_codec {
      out.push_str(&format!("use {}::codec::opaque;\n", runtime));
    }
    if needs_plain {
      out.push_str(&format!("use {}::codec::plain;\n", runtime));
    }
    if capabilities.numeric_parse || capabilities.generic_codec || needs_plain {
      out.push('\n');
    }

    for source in enum_sources {
      out.push_str(&source);
    }
    for plan in &plans {
      out.push_str(&emit_struct(plan, capabilities.generic_codec));
      out.push_str(&emit_selector(plan, runtime));
      out.push_str(&emit_record_impl(plan, &schema.package, runtime));
    }

    let unit = GeneratedUnit {
      package: schema.package.clone(),
      file_name: self.file_name(&schema.package),
      content: out.trim_end().to_string() + "\n",
    };
    debug!(
      package = %unit.package,
      file = %unit.file_name,
      messages = schema.messages.len(),
      enums = schema.enums.len(),
      "emitted unit"
    );
    Ok(unit)
  }
}
