/* Rust source emitters for one generated unit */

pub mod accessors;
pub mod helpers;
pub mod selectors;
pub mod types;

use crate::resolve::{ResolvedMessage, StorageField};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
  #[error("{context}: {name:?} is not a valid Rust identifier")]
  InvalidIdentifier { context: String, name: String },

  #[error("{context}: {first} and {second} both map to Rust name {ident}")]
  IdentifierCollision {
    context: String,
    first: String,
    second: String,
    ident: String,
  },

  #[error("type {name} would shadow the Rust type or module {ident}")]
  ReservedTypeName { name: String, ident: String },
}

/* Rust names of one message, checked for collisions */
pub struct MessagePlan<'a> {
  pub message: &'a ResolvedMessage,
  pub type_ident: String,
  pub selector_ident: String,
  pub fields: Vec<FieldPlan<'a>>,
}

pub struct FieldPlan<'a> {
  pub field: &'a StorageField,
  pub ident: String,
  pub variant: String,
}

impl<'a> MessagePlan<'a> {
  pub fn new(message: &'a ResolvedMessage) -> Result<Self, EmitError> {
    let type_ident = helpers::check_type_ident(&message.name)?;
    let selector_ident = format!("{}Field", type_ident);
    let mut idents = helpers::IdentScope::new(message.name.clone());
    let mut variants = helpers::IdentScope::new(format!("{} selectors", message.name));

    let mut fields = Vec::with_capacity(message.fields.len());
    for field in &message.fields {
      if !helpers::is_valid_identifier(&field.name) {
        return Err(EmitError::InvalidIdentifier {
          context: message.name.clone(),
          name: field.name.clone(),
        });
      }
      let ident = idents.claim(&field.name, helpers::escape_rust_keyword(&field.name))?;
      let variant = variants.claim(&field.name, helpers::variant_ident(&field.name))?;
      fields.push(FieldPlan { field, ident, variant });
    }

    Ok(Self {
      message,
      type_ident,
      selector_ident,
      fields,
    })
  }
}

pub use accessors::emit_record_impl;
pub use selectors::emit_selector;
pub use types::{emit_enum, emit_struct};
