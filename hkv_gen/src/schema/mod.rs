/* Schema front-ends and the IR builder */

pub mod descriptor;
pub mod file;
pub mod ir;

pub use descriptor::{file_to_schema, load_descriptor_set, DescriptorError};
pub use file::{load_schema_file, parse_schema, LoadError};
pub use ir::{EnumInfo, FieldInfo, MessageInfo, SchemaBuilder, SchemaError, SchemaIr, TypeRef};
