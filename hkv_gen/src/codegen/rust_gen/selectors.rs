/* Field selector enums
 *
 * Discriminants are the field tags, so a selector converts to its tag with a
 * plain cast and stays stable across regenerations. */

use super::MessagePlan;
use std::fmt::Write;

pub fn emit_selector(plan: &MessagePlan<'_>, runtime: &str) -> String {
  let ident = &plan.selector_ident;
  let empty = plan.fields.is_empty();
  let mut out = String::new();

  writeln!(&mut out, "/// Field selectors of [`{}`]; each discriminant is the field tag.", plan.type_ident).unwrap();
  writeln!(&mut out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]").unwrap();
  if !empty {
    writeln!(&mut out, "#[repr(u32)]").unwrap();
  }
  writeln!(&mut out, "pub enum {} {{", ident).unwrap();
  for field in &plan.fields {
    writeln!(&mut out, "    {} = {},", field.variant, field.field.tag).unwrap();
  }
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl {} {{", ident).unwrap();
  writeln!(&mut out, "    /// Every selector, in declaration order.").unwrap();
  writeln!(&mut out, "    pub const ALL: [{}; {}] = [", ident, plan.fields.len()).unwrap();
  for field in &plan.fields {
    writeln!(&mut out, "        {}::{},", ident, field.variant).unwrap();
  }
  writeln!(&mut out, "    ];\n").unwrap();

  writeln!(&mut out, "    pub const fn tag(self) -> u32 {{").unwrap();
  if empty {
    writeln!(&mut out, "        match self {{}}").unwrap();
  } else {
    writeln!(&mut out, "        self as u32").unwrap();
  }
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(&mut out, "    pub const fn name(self) -> &'static str {{").unwrap();
  writeln!(&mut out, "        match self {{").unwrap();
  for field in &plan.fields {
    writeln!(&mut out, "            Self::{} => {:?},", field.variant, field.field.name).unwrap();
  }
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}\n").unwrap();

  writeln!(&mut out, "    pub const fn from_tag(tag: u32) -> Option<Self> {{").unwrap();
  writeln!(&mut out, "        match tag {{").unwrap();
  for field in &plan.fields {
    writeln!(&mut out, "            {} => Some(Self::{}),", field.field.tag, field.variant).unwrap();
  }
  writeln!(&mut out, "            _ => None,").unwrap();
  writeln!(&mut out, "        }}").unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl From<{}> for u32 {{", ident).unwrap();
  writeln!(&mut out, "    fn from(field: {}) -> u32 {{", ident).unwrap();
  writeln!(&mut out, "        field.tag()").unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();

  writeln!(&mut out, "impl TryFrom<u32> for {} {{", ident).unwrap();
  writeln!(&mut out, "    type Error = {}::FieldError;\n", runtime).unwrap();
  writeln!(&mut out, "    fn try_from(tag: u32) -> Result<Self, Self::Error> {{").unwrap();
  writeln!(&mut out, "        Self::from_tag(tag).ok_or({}::FieldError::UnknownField(tag))", runtime).unwrap();
  writeln!(&mut out, "    }}").unwrap();
  writeln!(&mut out, "}}\n").unwrap();
  out
}
