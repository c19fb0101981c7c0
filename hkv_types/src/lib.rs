//! Schema Descriptor Types
//!
//! This crate contains the descriptor structures consumed by the hash accessor
//! generator: messages, fields and enums exactly as a schema front-end hands
//! them over. It carries no validation, file I/O or code generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
