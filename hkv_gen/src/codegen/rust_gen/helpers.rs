/* Helper utilities for Rust code generation */

use super::EmitError;
use crate::resolve::NativeType;
use std::collections::HashMap;

const RUST_KEYWORDS: &[&str] = &[
  "as", "break", "const", "continue", "crate", "else", "enum", "extern",
  "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
  "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
  "super", "trait", "true", "type", "unsafe", "use", "where", "while",
  "async", "await", "dyn", "abstract", "become", "box", "do", "final",
  "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
  "gen",
];

/* Names emitted code relies on unqualified: prelude types and variants,
 * primitives, and the codec modules imported at the top of a unit */
const RESERVED_TYPE_NAMES: &[&str] = &[
  "Option", "Some", "None", "Result", "Ok", "Err", "Vec", "String", "Box",
  "Default", "Clone", "Copy", "Debug", "PartialEq", "Eq", "PartialOrd", "Ord",
  "Hash", "Sized", "From", "Into", "TryFrom", "u8", "u32", "u64", "i32",
  "i64", "f32", "f64", "bool", "str", "numeric", "plain", "opaque",
];

/* Escape Rust keywords to valid identifiers */
pub fn escape_rust_keyword(name: &str) -> String {
  match name {
    /* Cannot be raw identifiers */
    "self" | "Self" | "super" | "crate" => format!("{}_", name),
    _ if RUST_KEYWORDS.contains(&name) => format!("r#{}", name),
    _ => name.to_string(),
  }
}

pub fn is_valid_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  name != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/* `user_name` -> `UserName`, `GENDER_MALE` -> `GenderMale`, `fooBar` -> `FooBar` */
pub fn to_upper_camel(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  for segment in name.split('_').filter(|s| !s.is_empty()) {
    let shouting = !segment.chars().any(|c| c.is_ascii_lowercase());
    let mut chars = segment.chars();
    if let Some(first) = chars.next() {
      out.push(first.to_ascii_uppercase());
      if shouting {
        out.extend(chars.map(|c| c.to_ascii_lowercase()));
      } else {
        out.extend(chars);
      }
    }
  }
  if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
    out.insert(0, '_');
  }
  out
}

/* Variant name for a field or enum symbol; never a keyword */
pub fn variant_ident(name: &str) -> String {
  let ident = to_upper_camel(name);
  if ident == "Self" {
    "Self_".to_string()
  } else {
    ident
  }
}

/* Rust type name for a qualified schema type: `User.Role` -> `UserRole` */
pub fn type_ident(qualified: &str) -> String {
  qualified.split('.').collect()
}

pub fn check_type_ident(qualified: &str) -> Result<String, EmitError> {
  let ident = type_ident(qualified);
  if !is_valid_identifier(&ident) || RUST_KEYWORDS.contains(&ident.as_str()) {
    return Err(EmitError::InvalidIdentifier {
      context: "type".to_string(),
      name: qualified.to_string(),
    });
  }
  if RESERVED_TYPE_NAMES.contains(&ident.as_str()) {
    return Err(EmitError::ReservedTypeName {
      name: qualified.to_string(),
      ident,
    });
  }
  Ok(ident)
}

/* Tracks the source name behind every emitted identifier of one namespace */
pub struct IdentScope {
  context: String,
  seen: HashMap<String, String>,
}

impl IdentScope {
  pub fn new(context: impl Into<String>) -> Self {
    Self {
      context: context.into(),
      seen: HashMap::new(),
    }
  }

  pub fn claim(&mut self, source: &str, ident: String) -> Result<String, EmitError> {
    if let Some(first) = self.seen.get(&ident) {
      return Err(EmitError::IdentifierCollision {
        context: self.context.clone(),
        first: first.clone(),
        second: source.to_string(),
        ident,
      });
    }
    self.seen.insert(ident.clone(), source.to_string());
    Ok(ident)
  }
}

/* Render a native type; `boxed` only applies to singular messages */
pub fn rust_type(native: &NativeType, singular_message_boxed: Option<bool>) -> String {
  match native {
    NativeType::U32 => "u32".to_string(),
    NativeType::U64 => "u64".to_string(),
    NativeType::I32 => "i32".to_string(),
    NativeType::I64 => "i64".to_string(),
    NativeType::F32 => "f32".to_string(),
    NativeType::F64 => "f64".to_string(),
    NativeType::Bool => "bool".to_string(),
    NativeType::String => "String".to_string(),
    NativeType::Bytes => "Vec<u8>".to_string(),
    NativeType::Enum(_) => "i32".to_string(),
    NativeType::Message(name) => match singular_message_boxed {
      Some(true) => format!("Option<Box<{}>>", type_ident(name)),
      Some(false) => format!("Option<{}>", type_ident(name)),
      None => type_ident(name),
    },
    NativeType::List(inner) => format!("Vec<{}>", rust_type(inner, None)),
    NativeType::Map(key, value) => format!(
      "::std::collections::HashMap<{}, {}>",
      rust_type(key, None),
      rust_type(value, None)
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keywords_are_escaped() {
    assert_eq!(escape_rust_keyword("type"), "r#type");
    assert_eq!(escape_rust_keyword("self"), "self_");
    assert_eq!(escape_rust_keyword("name"), "name");
  }

  #[test]
  fn upper_camel_case() {
    assert_eq!(to_upper_camel("user_name"), "UserName");
    assert_eq!(to_upper_camel("GENDER_MALE"), "GenderMale");
    assert_eq!(to_upper_camel("loginSource"), "LoginSource");
    assert_eq!(to_upper_camel("id"), "Id");
    assert_eq!(to_upper_camel("_2d"), "_2d");
    assert_eq!(variant_ident("self"), "Self_");
  }

  #[test]
  fn type_names() {
    assert_eq!(check_type_ident("User.Role").unwrap(), "UserRole");
    assert!(matches!(
      check_type_ident("String"),
      Err(EmitError::ReservedTypeName { .. })
    ));
    assert!(matches!(
      check_type_ident("Bad-Name"),
      Err(EmitError::InvalidIdentifier { .. })
    ));
  }

  #[test]
  fn rust_types() {
    let map = NativeType::Map(Box::new(NativeType::String), Box::new(NativeType::Enum("E".into())));
    assert_eq!(rust_type(&map, None), "::std::collections::HashMap<String, i32>");
    let msg = NativeType::Message("A.B".into());
    assert_eq!(rust_type(&msg, Some(true)), "Option<Box<AB>>");
    assert_eq!(rust_type(&NativeType::List(Box::new(msg)), None), "Vec<AB>");
  }

  #[test]
  fn collisions_are_reported() {
    let mut scope = IdentScope::new("User");
    scope.claim("user_name", "UserName".into()).unwrap();
    assert!(matches!(
      scope.claim("userName", "UserName".into()),
      Err(EmitError::IdentifierCollision { .. })
    ));
  }
}
