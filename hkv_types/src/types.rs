use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Field value kinds as reported by a schema front-end.
///
/// The last seven variants are protobuf kinds with no storage strategy. They
/// deserialize so that a schema using them fails with a precise build error
/// instead of a parse error.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Uint32,
    Uint64,
    Int32,
    Int64,
    #[serde(alias = "float")]
    Float32,
    #[serde(alias = "double")]
    Float64,
    String,
    Bool,
    Bytes,
    Enum,
    Message,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Group,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Bytes => "bytes",
            Kind::Enum => "enum",
            Kind::Message => "message",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
            Kind::Fixed32 => "fixed32",
            Kind::Fixed64 => "fixed64",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Group => "group",
        }
    }

    /// True for kinds whose field must name a nested enum or message type.
    pub fn is_named(&self) -> bool {
        matches!(self, Kind::Enum | Kind::Message)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[default]
    Singular,
    Repeated,
    Map,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cardinality::Singular => "singular",
            Cardinality::Repeated => "repeated",
            Cardinality::Map => "map",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescriptor {
    pub name: String,
    /// Stable identity of the field. Renaming a field never changes its tag.
    pub tag: u32,
    #[serde(default)]
    pub cardinality: Cardinality,
    pub kind: Kind,
    /// Referenced enum or message for `enum`/`message` kinds, or for the value
    /// side of a map whose `map-value` is an enum or message.
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub map_key: Option<Kind>,
    #[serde(default)]
    pub map_value: Option<Kind>,
}

impl FieldDescriptor {
    pub fn scalar(name: &str, tag: u32, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            tag,
            cardinality: Cardinality::Singular,
            kind,
            type_name: None,
            map_key: None,
            map_value: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDescriptor {
    pub name: String,
    /// Symbolic name to value, in declaration order.
    pub values: IndexMap<String, i32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MessageDescriptor {
    pub name: String,
    /// Declaration order is informational; access is always by tag.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Enums declared inside this message.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaMetadata {
    pub package: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One schema document: a package with its top-level enums and messages.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaFile {
    pub schema: SchemaMetadata,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
}
