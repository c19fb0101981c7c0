pub mod rust;
pub mod rust_gen;

pub use rust::{GeneratedUnit, RustCodeGenerator, RustCodeGeneratorOptions};
pub use rust_gen::EmitError;
