pub mod analyze;
pub mod codegen;
pub mod common;
pub mod fetch;
