/* HashRecord impls and the selective set/get accessors */

use super::MessagePlan;
use crate::resolve::{DirectEncoding, StorageStrategy};
use std::fmt::Write;

fn encode_expr(strategy: StorageStrategy, field: &str) -> String {
  match strategy {
    StorageStrategy::Direct(
      DirectEncoding::Integer | DirectEncoding::Float | DirectEncoding::Enum,
    ) => format!("Ok(numeric::encode(&self.{}))", field),
    StorageStrategy::Direct(DirectEncoding::Bool) => format!("Ok(plain::encode_bool(self.{}))", field),
    StorageStrategy::Direct(DirectEncoding::Text) => format!("Ok(plain::encode_string(&self.{}))", field),
    StorageStrategy::Direct(DirectEncoding::Bytes) => format!("Ok(plain::encode_bytes(&self.{}))", field),
    StorageStrategy::Opaque => format!("Ok(opaque::encode(&self.{})?)", field),
  }
}

fn decode_stmt(strategy: StorageStrategy, field: &str) -> String {
  match strategy {
    StorageStrategy::Direct(
      DirectEncoding::Integer | DirectEncoding::Float | DirectEncoding::Enum,
    ) => format!("self.{} = numeric::decode(value)?", field),
    StorageStrategy::Direct(DirectEncoding::Bool) => format!("self.{} = plain::decode_bool(value)?", field),
    StorageStrategy::Direct(DirectEncoding::Text) => format!("self.{} = plain::decode_string(value)?", field),
    StorageStrategy::Direct(DirectEncoding::Bytes) => format!("self.{} = plain::decode_bytes(value)", field),
    StorageStrategy::Opaque => format!("self.{} = opaque::decode(value)?", field),
  }
}

pub fn emit_record_impl(plan: &MessagePlan<'_>, package: &str, runtime: &str) -> String {
  let ty = &plan.type_ident;
  let selector = &plan.selector_ident;
  let mut out = String::new();

  writeln!(&mut out, "impl {}::HashRecord for {} {{", runtime, ty).unwrap();
  writeln!(
    &mut out,
    "    const MESSAGE_NAME: &'static str = {:?};\n",
    format!("{}.{}", package, plan.message.name)
  )
  .unwrap();

  writeln!(&mut out, "    fn field_name(tag: u32) -> Option<&'static str> {{").unwrap();
  writeln!(&mut out, "        match {}::from_tag(tag) {{", selector).unwrap();
  writeln!(&mut out, "            Some(field) => Some(field.name()),").unwrap();
  writeln!(&mut out, "            None => None,").unwrap();
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(
    &mut out,
    "    fn encode_field(&self, tag: u32) -> Result<Vec<u8>, {}::FieldError> {{",
    runtime
  )
  .unwrap();
  if plan.fields.is_empty() {
    writeln!(&mut out, "        Err({}::FieldError::UnknownField(tag))", runtime).unwrap();
  } else {
    writeln!(&mut out, "        match tag {{").unwrap();
    for field in &plan.fields {
      writeln!(
        &mut out,
        "            {} => {},",
        field.field.tag,
        encode_expr(field.field.strategy, &field.ident)
      )
      .unwrap();
    }
    writeln!(&mut out, "            _ => Err({}::FieldError::UnknownField(tag)),", runtime).unwrap();
    writeln!(&mut out, "        }}").unwrap();
  }
  writeln!(&mut out, "    }}\n").unwrap();

  let value_param = if plan.fields.is_empty() { "_value" } else { "value" };
  writeln!(
    &mut out,
    "    fn decode_field(&mut self, tag: u32, {}: &[u8]) -> Result<(), {}::FieldError> {{",
    value_param, runtime
  )
  .unwrap();
  if plan.fields.is_empty() {
    writeln!(&mut out, "        Err({}::FieldError::UnknownField(tag))", runtime).unwrap();
  } else {
    writeln!(&mut out, "        match tag {{").unwrap();
    for field in &plan.fields {
      writeln!(
        &mut out,
        "            {} => {},",
        field.field.tag,
        decode_stmt(field.field.strategy, &field.ident)
      )
      .unwrap();
    }
    writeln!(&mut out, "            _ => return Err({}::FieldError::UnknownField(tag)),", runtime).unwrap();
    writeln!(&mut out, "        }}").unwrap();
    writeln!(&mut out, "        Ok(())").unwrap();
  }
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl {} {{", ty).unwrap();
  writeln!(&mut out, "    /// Writes the selected fields to `namespace:id_a:id_b` in a single store command.").unwrap();
  writeln!(&mut out, "    pub fn set_fields<S: {}::HashStore + ?Sized>(", runtime).unwrap();
  writeln!(&mut out, "        &self,").unwrap();
  writeln!(&mut out, "        store: &mut S,").unwrap();
  writeln!(&mut out, "        namespace: &str,").unwrap();
  writeln!(&mut out, "        id_a: u64,").unwrap();
  writeln!(&mut out, "        id_b: u64,").unwrap();
  writeln!(&mut out, "        fields: &[{}],", selector).unwrap();
  writeln!(&mut out, "    ) -> Result<(), {}::AccessError> {{", runtime).unwrap();
  writeln!(&mut out, "        let key = {}::CompositeKey::new(namespace, id_a, id_b);", runtime).unwrap();
  writeln!(&mut out, "        {}::write_fields(store, &key, self, fields)", runtime).unwrap();
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(&mut out, "    /// Reads the selected fields from `namespace:id_a:id_b` in a single store command.").unwrap();
  writeln!(&mut out, "    ///").unwrap();
  writeln!(&mut out, "    /// Fields with no stored value are left unchanged.").unwrap();
  writeln!(&mut out, "    pub fn get_fields<S: {}::HashStore + ?Sized>(", runtime).unwrap();
  writeln!(&mut out, "        &mut self,").unwrap();
  writeln!(&mut out, "        store: &mut S,").unwrap();
  writeln!(&mut out, "        namespace: &str,").unwrap();
  writeln!(&mut out, "        id_a: u64,").unwrap();
  writeln!(&mut out, "        id_b: u64,").unwrap();
  writeln!(&mut out, "        fields: &[{}],", selector).unwrap();
  writeln!(&mut out, "    ) -> Result<(), {}::AccessError> {{", runtime).unwrap();
  writeln!(&mut out, "        let key = {}::CompositeKey::new(namespace, id_a, id_b);", runtime).unwrap();
  writeln!(&mut out, "        {}::read_fields(store, &key, self, fields)", runtime).unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();
  out
}
