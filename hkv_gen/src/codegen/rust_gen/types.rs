/* Enum tables and message structs */

use super::helpers::{check_type_ident, rust_type, variant_ident, IdentScope};
use super::{EmitError, MessagePlan};
use crate::resolve::{NativeType, StorageField};
use crate::schema::ir::EnumInfo;
use std::fmt::Write;

pub fn emit_enum(info: &EnumInfo) -> Result<String, EmitError> {
  let ident = check_type_ident(&info.name)?;
  let mut scope = IdentScope::new(info.name.clone());
  let mut variants = Vec::with_capacity(info.values.len());
  for (symbol, value) in &info.values {
    variants.push((scope.claim(symbol, variant_ident(symbol))?, symbol, *value));
  }

  let mut out = String::new();
  writeln!(&mut out, "/// Values of enum `{}`.", info.name).unwrap();
  writeln!(&mut out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]").unwrap();
  writeln!(&mut out, "#[repr(i32)]").unwrap();
  writeln!(&mut out, "pub enum {} {{", ident).unwrap();
  for (variant, _, value) in &variants {
    writeln!(&mut out, "    {} = {},", variant, value).unwrap();
  }
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl {} {{", ident).unwrap();
  writeln!(&mut out, "    /// Symbolic name to value, in declaration order.").unwrap();
  writeln!(&mut out, "    pub const VALUES: &'static [(&'static str, i32)] = &[").unwrap();
  for (_, symbol, value) in &variants {
    writeln!(&mut out, "        ({:?}, {}),", symbol, value).unwrap();
  }
  writeln!(&mut out, "    ];\n").unwrap();

  writeln!(&mut out, "    pub const fn from_i32(value: i32) -> Option<Self> {{").unwrap();
  writeln!(&mut out, "        match value {{").unwrap();
  for (variant, _, value) in &variants {
    writeln!(&mut out, "            {} => Some(Self::{}),", value, variant).unwrap();
  }
  writeln!(&mut out, "            _ => None,").unwrap();
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(&mut out, "    pub const fn as_str_name(self) -> &'static str {{").unwrap();
  writeln!(&mut out, "        match self {{").unwrap();
  for (variant, symbol, _) in &variants {
    writeln!(&mut out, "            Self::{} => {:?},", variant, symbol).unwrap();
  }
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(&mut out, "    pub fn from_str_name(name: &str) -> Option<Self> {{").unwrap();
  writeln!(&mut out, "        match name {{").unwrap();
  for (variant, symbol, _) in &variants {
    writeln!(&mut out, "            {:?} => Some(Self::{}),", symbol, variant).unwrap();
  }
  writeln!(&mut out, "            _ => None,").unwrap();
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl From<{}> for i32 {{", ident).unwrap();
  writeln!(&mut out, "    fn from(value: {}) -> i32 {{", ident).unwrap();
  writeln!(&mut out, "        value as i32").unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();
  Ok(out)
}

/* Field type as declared on the struct */
pub fn field_type(field: &StorageField) -> String {
  match (&field.native_type, field.cardinality) {
    (NativeType::Message(_), hkv_types::Cardinality::Singular) => {
      rust_type(&field.native_type, Some(field.boxed))
    }
    (native, _) => rust_type(native, None),
  }
}

pub fn emit_struct(plan: &MessagePlan<'_>, derive_serde: bool) -> String {
  let mut out = String::new();
  writeln!(&mut out, "/// Message `{}`.", plan.message.name).unwrap();
  writeln!(&mut out, "#[derive(Debug, Clone, PartialEq, Default)]").unwrap();
  if derive_serde {
    writeln!(&mut out, "#[derive(::serde::Serialize, ::serde::Deserialize)]").unwrap();
  }
  writeln!(&mut out, "pub struct {} {{", plan.type_ident).unwrap();
  for field in &plan.fields {
    match &field.field.native_type {
      NativeType::Enum(name) => writeln!(
        &mut out,
        "    /// Tag {}, values from [`{}`].",
        field.field.tag,
        super::helpers::type_ident(name)
      )
      .unwrap(),
      _ => writeln!(&mut out, "    /// Tag {}.", field.field.tag).unwrap(),
    }
    writeln!(&mut out, "    pub {}: {},", field.ident, field_type(field.field)).unwrap();
  }
  writeln!(&mut out, "}}\n").unwrap();
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enum_table() {
    let info = EnumInfo {
      name: "User.Role".into(),
      values: vec![("ROLE_ADMIN".into(), 0), ("ROLE_GUEST".into(), -3)],
    };
    let out = emit_enum(&info).unwrap();
    assert!(out.contains("#[repr(i32)]\npub enum UserRole {"));
    assert!(out.contains("    RoleGuest = -3,"));
    assert!(out.contains("(\"ROLE_ADMIN\", 0),"));
    assert!(out.contains("-3 => Some(Self::RoleGuest),"));
    assert!(out.contains("\"ROLE_GUEST\" => Some(Self::RoleGuest),"));
    assert!(out.contains("impl From<UserRole> for i32 {"));
  }

  #[test]
  fn enum_variant_collision() {
    let info = EnumInfo {
      name: "E".into(),
      values: vec![("FOO_BAR".into(), 0), ("FooBar".into(), 1)],
    };
    assert!(matches!(
      emit_enum(&info),
      Err(EmitError::IdentifierCollision { .. })
    ));
  }
}
