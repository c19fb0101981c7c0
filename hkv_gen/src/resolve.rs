//! Storage-strategy resolver.
//!
//! Classifies every field of a [`SchemaIr`] into a storage strategy, picks its
//! native Rust type and records which codec capability the generated unit
//! has to import. Classification is a pure function of cardinality and kind.

use crate::schema::ir::{EnumInfo, FieldInfo, MessageInfo, SchemaIr, TypeRef};
use hkv_types::{Cardinality, Kind};
use serde_derive::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{message}.{field}: {cardinality} {kind} fields are not supported")]
    UnsupportedKind {
        message: String,
        field: String,
        cardinality: Cardinality,
        kind: Kind,
    },

    #[error("{message}.{field}: map keys of kind {kind} are not supported")]
    UnsupportedMapKey {
        message: String,
        field: String,
        kind: Kind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectEncoding {
    /// Decimal integer text.
    Integer,
    /// Shortest round-trip decimal text.
    Float,
    /// The enum's i32 value as decimal text.
    Enum,
    /// `1` / `0`.
    Bool,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageStrategy {
    Direct(DirectEncoding),
    Opaque,
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageStrategy::Direct(encoding) => {
                let name = match encoding {
                    DirectEncoding::Integer => "integer",
                    DirectEncoding::Float => "float",
                    DirectEncoding::Enum => "enum",
                    DirectEncoding::Bool => "bool",
                    DirectEncoding::Text => "text",
                    DirectEncoding::Bytes => "bytes",
                };
                write!(f, "direct/{}", name)
            }
            StorageStrategy::Opaque => f.write_str("opaque"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    None,
    NumericParse,
    GenericCodec,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::None => "none",
            Capability::NumericParse => "numeric-parse",
            Capability::GenericCodec => "generic-codec",
        })
    }
}

/// Union of the capabilities every field of a unit needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Capabilities {
    pub numeric_parse: bool,
    pub generic_codec: bool,
}

impl Capabilities {
    pub fn add(&mut self, capability: Capability) {
        match capability {
            Capability::None => {}
            Capability::NumericParse => self.numeric_parse = true,
            Capability::GenericCodec => self.generic_codec = true,
        }
    }
}

/// Semantic type of a field value; rendered to Rust by the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NativeType {
    U32,
    U64,
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Bytes,
    /// Open enum carried as its i32 value.
    Enum(String),
    Message(String),
    List(Box<NativeType>),
    Map(Box<NativeType>, Box<NativeType>),
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::U32 => f.write_str("u32"),
            NativeType::U64 => f.write_str("u64"),
            NativeType::I32 => f.write_str("i32"),
            NativeType::I64 => f.write_str("i64"),
            NativeType::F32 => f.write_str("f32"),
            NativeType::F64 => f.write_str("f64"),
            NativeType::Bool => f.write_str("bool"),
            NativeType::String => f.write_str("string"),
            NativeType::Bytes => f.write_str("bytes"),
            NativeType::Enum(name) => write!(f, "enum {}", name),
            NativeType::Message(name) => write!(f, "message {}", name),
            NativeType::List(inner) => write!(f, "list<{}>", inner),
            NativeType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageField {
    pub tag: u32,
    pub name: String,
    pub cardinality: Cardinality,
    pub kind: Kind,
    pub strategy: StorageStrategy,
    pub native_type: NativeType,
    pub capability: Capability,
    /// Singular message value that can contain its own message again.
    pub boxed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedMessage {
    pub name: String,
    pub fields: Vec<StorageField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedSchema {
    pub package: String,
    pub messages: Vec<ResolvedMessage>,
    pub enums: Vec<EnumInfo>,
    pub capabilities: Capabilities,
}

impl ResolvedSchema {
    pub fn message(&self, name: &str) -> Option<&ResolvedMessage> {
        self.messages.iter().find(|m| m.name == name)
    }
}

/// Storage strategy for a `(cardinality, kind)` pair.
///
/// `None` for kinds with no storage representation.
pub fn classify(cardinality: Cardinality, kind: Kind) -> Option<StorageStrategy> {
    match (cardinality, kind) {
        (Cardinality::Repeated | Cardinality::Map, _) if !is_supported(kind) => None,
        (Cardinality::Repeated | Cardinality::Map, _) => Some(StorageStrategy::Opaque),
        (Cardinality::Singular, Kind::Message) => Some(StorageStrategy::Opaque),
        (Cardinality::Singular, kind) => direct_encoding(kind).map(StorageStrategy::Direct),
    }
}

fn direct_encoding(kind: Kind) -> Option<DirectEncoding> {
    match kind {
        Kind::Uint32 | Kind::Uint64 | Kind::Int32 | Kind::Int64 => Some(DirectEncoding::Integer),
        Kind::Float32 | Kind::Float64 => Some(DirectEncoding::Float),
        Kind::Enum => Some(DirectEncoding::Enum),
        Kind::Bool => Some(DirectEncoding::Bool),
        Kind::String => Some(DirectEncoding::Text),
        Kind::Bytes => Some(DirectEncoding::Bytes),
        Kind::Message
        | Kind::Sint32
        | Kind::Sint64
        | Kind::Fixed32
        | Kind::Fixed64
        | Kind::Sfixed32
        | Kind::Sfixed64
        | Kind::Group => None,
    }
}

fn is_supported(kind: Kind) -> bool {
    kind == Kind::Message || direct_encoding(kind).is_some()
}

fn is_map_key(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Uint32 | Kind::Uint64 | Kind::Int32 | Kind::Int64 | Kind::String | Kind::Bool
    )
}

pub fn capability_of(strategy: StorageStrategy) -> Capability {
    match strategy {
        StorageStrategy::Direct(
            DirectEncoding::Integer | DirectEncoding::Float | DirectEncoding::Enum,
        ) => Capability::NumericParse,
        StorageStrategy::Direct(_) => Capability::None,
        StorageStrategy::Opaque => Capability::GenericCodec,
    }
}

pub fn resolve(ir: &SchemaIr) -> Result<ResolvedSchema, ResolveError> {
    let graph = SingularGraph::new(&ir.messages);
    let mut capabilities = Capabilities::default();
    let mut messages = Vec::with_capacity(ir.messages.len());

    for message in &ir.messages {
        let mut fields = Vec::with_capacity(message.fields.len());
        for field in &message.fields {
            let resolved = resolve_field(message, field, &graph)?;
            capabilities.add(resolved.capability);
            fields.push(resolved);
        }
        messages.push(ResolvedMessage {
            name: message.name.clone(),
            fields,
        });
    }

    Ok(ResolvedSchema {
        package: ir.package.clone(),
        messages,
        enums: ir.enums.clone(),
        capabilities,
    })
}

fn resolve_field(
    message: &MessageInfo,
    field: &FieldInfo,
    graph: &SingularGraph<'_>,
) -> Result<StorageField, ResolveError> {
    let unsupported = |kind: Kind| ResolveError::UnsupportedKind {
        message: message.name.clone(),
        field: field.name.clone(),
        cardinality: field.cardinality,
        kind,
    };

    let (strategy, native_type) = match field.cardinality {
        Cardinality::Map => {
            /* The IR builder guarantees both kinds on map fields */
            let (Some(key), Some(value)) = (field.map_key, field.map_value) else {
                return Err(unsupported(field.kind));
            };
            if !is_map_key(key) {
                return Err(ResolveError::UnsupportedMapKey {
                    message: message.name.clone(),
                    field: field.name.clone(),
                    kind: key,
                });
            }
            let strategy = classify(Cardinality::Map, value).ok_or_else(|| unsupported(value))?;
            let key_type = scalar_type(key, None).ok_or_else(|| unsupported(key))?;
            let value_type =
                scalar_type(value, field.type_ref.as_ref()).ok_or_else(|| unsupported(value))?;
            (strategy, NativeType::Map(Box::new(key_type), Box::new(value_type)))
        }
        cardinality => {
            let strategy =
                classify(cardinality, field.kind).ok_or_else(|| unsupported(field.kind))?;
            let element = scalar_type(field.kind, field.type_ref.as_ref())
                .ok_or_else(|| unsupported(field.kind))?;
            let native_type = if cardinality == Cardinality::Repeated {
                NativeType::List(Box::new(element))
            } else {
                element
            };
            (strategy, native_type)
        }
    };

    let boxed = match (&field.cardinality, &field.type_ref) {
        (Cardinality::Singular, Some(TypeRef::Message(target))) => {
            graph.reaches(target, &message.name)
        }
        _ => false,
    };

    Ok(StorageField {
        tag: field.tag,
        name: field.name.clone(),
        cardinality: field.cardinality,
        kind: field.kind,
        strategy,
        native_type,
        capability: capability_of(strategy),
        boxed,
    })
}

fn scalar_type(kind: Kind, type_ref: Option<&TypeRef>) -> Option<NativeType> {
    Some(match kind {
        Kind::Uint32 => NativeType::U32,
        Kind::Uint64 => NativeType::U64,
        Kind::Int32 => NativeType::I32,
        Kind::Int64 => NativeType::I64,
        Kind::Float32 => NativeType::F32,
        Kind::Float64 => NativeType::F64,
        Kind::Bool => NativeType::Bool,
        Kind::String => NativeType::String,
        Kind::Bytes => NativeType::Bytes,
        Kind::Enum => NativeType::Enum(type_ref?.name().to_string()),
        Kind::Message => NativeType::Message(type_ref?.name().to_string()),
        _ => return None,
    })
}

/* Edges along singular message fields only; lists and maps are heap
 * allocated already and never need boxing */
struct SingularGraph<'a> {
    edges: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> SingularGraph<'a> {
    fn new(messages: &'a [MessageInfo]) -> Self {
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        for message in messages {
            let targets = message
                .fields
                .iter()
                .filter(|f| f.cardinality == Cardinality::Singular)
                .filter_map(|f| match &f.type_ref {
                    Some(TypeRef::Message(target)) => Some(target.as_str()),
                    _ => None,
                })
                .collect();
            edges.insert(message.name.as_str(), targets);
        }
        Self { edges }
    }

    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            if let Some(next) = self.edges.get(node) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ir::SchemaBuilder;
    use hkv_types::{FieldDescriptor, MessageDescriptor, SchemaFile, SchemaMetadata};

    const ALL_KINDS: [Kind; 18] = [
        Kind::Uint32,
        Kind::Uint64,
        Kind::Int32,
        Kind::Int64,
        Kind::Float32,
        Kind::Float64,
        Kind::String,
        Kind::Bool,
        Kind::Bytes,
        Kind::Enum,
        Kind::Message,
        Kind::Sint32,
        Kind::Sint64,
        Kind::Fixed32,
        Kind::Fixed64,
        Kind::Sfixed32,
        Kind::Sfixed64,
        Kind::Group,
    ];

    fn ir(messages: Vec<MessageDescriptor>) -> SchemaIr {
        let mut builder = SchemaBuilder::new();
        builder.add_file(SchemaFile {
            schema: SchemaMetadata {
                package: "p".into(),
                description: None,
            },
            enums: vec![],
            messages,
        });
        builder.build().unwrap().remove(0)
    }

    fn message(name: &str, fields: Vec<FieldDescriptor>) -> MessageDescriptor {
        MessageDescriptor {
            name: name.into(),
            fields,
            enums: vec![],
        }
    }

    fn msg_field(name: &str, tag: u32, cardinality: Cardinality, target: &str) -> FieldDescriptor {
        FieldDescriptor {
            cardinality,
            type_name: Some(target.into()),
            ..FieldDescriptor::scalar(name, tag, Kind::Message)
        }
    }

    #[test]
    fn classification_table() {
        use DirectEncoding::*;
        let singular = |k| classify(Cardinality::Singular, k);
        assert_eq!(singular(Kind::Uint64), Some(StorageStrategy::Direct(Integer)));
        assert_eq!(singular(Kind::Int32), Some(StorageStrategy::Direct(Integer)));
        assert_eq!(singular(Kind::Float32), Some(StorageStrategy::Direct(Float)));
        assert_eq!(singular(Kind::Enum), Some(StorageStrategy::Direct(Enum)));
        assert_eq!(singular(Kind::Bool), Some(StorageStrategy::Direct(Bool)));
        assert_eq!(singular(Kind::String), Some(StorageStrategy::Direct(Text)));
        assert_eq!(singular(Kind::Bytes), Some(StorageStrategy::Direct(Bytes)));
        assert_eq!(singular(Kind::Message), Some(StorageStrategy::Opaque));
        assert_eq!(
            classify(Cardinality::Repeated, Kind::Bytes),
            Some(StorageStrategy::Opaque)
        );
        assert_eq!(classify(Cardinality::Map, Kind::Enum), Some(StorageStrategy::Opaque));
    }

    #[test]
    fn every_kind_is_classified_or_rejected() {
        for cardinality in [Cardinality::Singular, Cardinality::Repeated, Cardinality::Map] {
            for kind in ALL_KINDS {
                let supported = classify(cardinality, kind).is_some();
                let expected = !matches!(
                    kind,
                    Kind::Sint32
                        | Kind::Sint64
                        | Kind::Fixed32
                        | Kind::Fixed64
                        | Kind::Sfixed32
                        | Kind::Sfixed64
                        | Kind::Group
                );
                assert_eq!(supported, expected, "{} {}", cardinality, kind);
            }
        }
    }

    #[test]
    fn capabilities_follow_strategies() {
        let only_text = ir(vec![message(
            "M",
            vec![
                FieldDescriptor::scalar("s", 1, Kind::String),
                FieldDescriptor::scalar("b", 2, Kind::Bool),
                FieldDescriptor::scalar("raw", 3, Kind::Bytes),
            ],
        )]);
        assert_eq!(resolve(&only_text).unwrap().capabilities, Capabilities::default());

        let mixed = ir(vec![
            message("A", vec![FieldDescriptor::scalar("n", 1, Kind::Int64)]),
            message("B", vec![msg_field("a", 1, Cardinality::Repeated, "A")]),
        ]);
        let resolved = resolve(&mixed).unwrap();
        assert_eq!(
            resolved.capabilities,
            Capabilities {
                numeric_parse: true,
                generic_codec: true,
            }
        );
        assert_eq!(resolved.messages[0].fields[0].capability, Capability::NumericParse);
        assert_eq!(resolved.messages[1].fields[0].capability, Capability::GenericCodec);
    }

    #[test]
    fn unsupported_kinds_fail() {
        let schema = ir(vec![message("M", vec![FieldDescriptor::scalar("x", 1, Kind::Sfixed64)])]);
        assert_eq!(
            resolve(&schema),
            Err(ResolveError::UnsupportedKind {
                message: "M".into(),
                field: "x".into(),
                cardinality: Cardinality::Singular,
                kind: Kind::Sfixed64,
            })
        );

        let mut float_key = FieldDescriptor::scalar("m", 1, Kind::Message);
        float_key.cardinality = Cardinality::Map;
        float_key.map_key = Some(Kind::Float64);
        float_key.map_value = Some(Kind::String);
        let schema = ir(vec![message("M", vec![float_key.clone()])]);
        assert!(matches!(resolve(&schema), Err(ResolveError::UnsupportedMapKey { .. })));

        float_key.map_key = Some(Kind::String);
        float_key.map_value = Some(Kind::Sint32);
        let schema = ir(vec![message("M", vec![float_key])]);
        assert!(matches!(resolve(&schema), Err(ResolveError::UnsupportedKind { .. })));
    }

    #[test]
    fn native_types() {
        let mut map = FieldDescriptor::scalar("m", 3, Kind::Message);
        map.cardinality = Cardinality::Map;
        map.map_key = Some(Kind::Uint32);
        map.map_value = Some(Kind::Message);
        map.type_name = Some("A".into());
        let mut tags = FieldDescriptor::scalar("tags", 2, Kind::String);
        tags.cardinality = Cardinality::Repeated;

        let schema = ir(vec![
            message("A", vec![]),
            message("B", vec![msg_field("a", 1, Cardinality::Singular, "A"), tags, map]),
        ]);
        let resolved = resolve(&schema).unwrap();
        let fields = &resolved.message("B").unwrap().fields;
        assert_eq!(fields[0].native_type, NativeType::Message("A".into()));
        assert!(!fields[0].boxed);
        assert_eq!(fields[1].native_type, NativeType::List(Box::new(NativeType::String)));
        assert_eq!(fields[2].native_type.to_string(), "map<u32, message A>");
    }

    #[test]
    fn recursion_through_singular_edges_is_boxed() {
        let schema = ir(vec![
            message("Node", vec![msg_field("next", 1, Cardinality::Singular, "Node")]),
            message(
                "Ping",
                vec![
                    msg_field("pong", 1, Cardinality::Singular, "Pong"),
                    msg_field("leaf", 2, Cardinality::Singular, "Leaf"),
                ],
            ),
            message("Pong", vec![msg_field("ping", 1, Cardinality::Singular, "Ping")]),
            message("Leaf", vec![]),
            message("Tree", vec![msg_field("children", 1, Cardinality::Repeated, "Tree")]),
        ]);
        let resolved = resolve(&schema).unwrap();
        let boxed = |m: &str, tag: u32| {
            resolved
                .message(m)
                .unwrap()
                .fields
                .iter()
                .find(|f| f.tag == tag)
                .unwrap()
                .boxed
        };
        assert!(boxed("Node", 1));
        assert!(boxed("Ping", 1));
        assert!(boxed("Pong", 1));
        assert!(!boxed("Ping", 2));
        assert!(!boxed("Tree", 1));
    }

    #[test]
    fn resolution_is_deterministic() {
        let schema = ir(vec![message(
            "M",
            vec![
                FieldDescriptor::scalar("a", 1, Kind::Float64),
                FieldDescriptor::scalar("b", 2, Kind::Bytes),
            ],
        )]);
        assert_eq!(resolve(&schema).unwrap(), resolve(&schema).unwrap());
    }
}
