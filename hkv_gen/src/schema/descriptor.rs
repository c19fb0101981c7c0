/* Protobuf descriptor front-end
 *
 * Converts `FileDescriptorProto`s, as produced by `protoc
 * --descriptor_set_out` or handed to a protoc plugin, into schema documents.
 * Nested types are flattened with dotted names and map-entry types are
 * folded back into map fields. */

use hkv_types::{
    Cardinality, EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, SchemaFile,
    SchemaMetadata,
};
use indexmap::IndexMap;
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode descriptor set {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: prost::DecodeError,
    },

    #[error("{file}: field {message}.{field} has invalid number {number}")]
    InvalidNumber {
        file: String,
        message: String,
        field: String,
        number: i32,
    },

    #[error("{file}: enum {name} declares {symbol} twice")]
    DuplicateEnumSymbol {
        file: String,
        name: String,
        symbol: String,
    },

    #[error("{file}: map entry {name} is malformed")]
    MalformedMapEntry { file: String, name: String },
}

/* Key and value of a map-entry message, by fully qualified entry name */
#[derive(Debug, Clone)]
struct MapEntry {
    key: Kind,
    value: Kind,
    value_type: Option<String>,
}

pub fn load_descriptor_set(path: &Path) -> Result<Vec<SchemaFile>, DescriptorError> {
    let bytes = std::fs::read(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = FileDescriptorSet::decode(bytes.as_slice()).map_err(|source| {
        DescriptorError::Decode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    set.file.iter().map(file_to_schema).collect()
}

/// Package name used for a file; falls back to the file stem.
pub fn package_of(file: &FileDescriptorProto) -> String {
    if !file.package().is_empty() {
        return file.package().to_string();
    }
    Path::new(file.name())
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn file_to_schema(file: &FileDescriptorProto) -> Result<SchemaFile, DescriptorError> {
    let package = package_of(file);
    let mut converter = Converter {
        file: file.name().to_string(),
        map_entries: HashMap::new(),
        messages: Vec::new(),
    };

    let scope = if file.package().is_empty() {
        String::new()
    } else {
        format!(".{}", file.package())
    };
    for message in &file.message_type {
        converter.collect_map_entries(&scope, message)?;
    }

    let enums = file
        .enum_type
        .iter()
        .map(|e| converter.convert_enum(e))
        .collect::<Result<Vec<_>, _>>()?;
    for message in &file.message_type {
        converter.convert_message(None, message)?;
    }

    Ok(SchemaFile {
        schema: SchemaMetadata {
            package,
            description: None,
        },
        enums,
        messages: converter.messages,
    })
}

struct Converter {
    file: String,
    map_entries: HashMap<String, MapEntry>,
    messages: Vec<MessageDescriptor>,
}

impl Converter {
    fn collect_map_entries(
        &mut self,
        scope: &str,
        message: &DescriptorProto,
    ) -> Result<(), DescriptorError> {
        let full_name = format!("{}.{}", scope, message.name());
        if is_map_entry(message) {
            let key = message.field.iter().find(|f| f.number() == 1);
            let value = message.field.iter().find(|f| f.number() == 2);
            let (Some(key), Some(value)) = (key, value) else {
                return Err(DescriptorError::MalformedMapEntry {
                    file: self.file.clone(),
                    name: full_name,
                });
            };
            self.map_entries.insert(
                full_name.clone(),
                MapEntry {
                    key: kind_of(key.r#type()),
                    value: kind_of(value.r#type()),
                    value_type: value.type_name.clone().filter(|t| !t.is_empty()),
                },
            );
        }
        for nested in &message.nested_type {
            self.collect_map_entries(&full_name, nested)?;
        }
        Ok(())
    }

    fn convert_enum(&self, desc: &EnumDescriptorProto) -> Result<EnumDescriptor, DescriptorError> {
        let mut values = IndexMap::new();
        for value in &desc.value {
            if values
                .insert(value.name().to_string(), value.number())
                .is_some()
            {
                return Err(DescriptorError::DuplicateEnumSymbol {
                    file: self.file.clone(),
                    name: desc.name().to_string(),
                    symbol: value.name().to_string(),
                });
            }
        }
        Ok(EnumDescriptor {
            name: desc.name().to_string(),
            values,
        })
    }

    fn convert_message(
        &mut self,
        parent: Option<&str>,
        message: &DescriptorProto,
    ) -> Result<(), DescriptorError> {
        if is_map_entry(message) {
            return Ok(());
        }
        let name = match parent {
            Some(parent) => format!("{}.{}", parent, message.name()),
            None => message.name().to_string(),
        };

        let mut fields = Vec::with_capacity(message.field.len());
        for field in &message.field {
            let tag = u32::try_from(field.number())
                .ok()
                .filter(|tag| *tag > 0)
                .ok_or_else(|| DescriptorError::InvalidNumber {
                    file: self.file.clone(),
                    message: name.clone(),
                    field: field.name().to_string(),
                    number: field.number(),
                })?;
            let type_name = field.type_name.clone().filter(|t| !t.is_empty());
            let repeated = field.label() == Label::Repeated;

            let map_entry = type_name
                .as_ref()
                .filter(|_| repeated && field.r#type() == Type::Message)
                .and_then(|t| self.map_entries.get(t))
                .cloned();

            fields.push(match map_entry {
                Some(entry) => FieldDescriptor {
                    name: field.name().to_string(),
                    tag,
                    cardinality: Cardinality::Map,
                    kind: Kind::Message,
                    type_name: entry.value_type,
                    map_key: Some(entry.key),
                    map_value: Some(entry.value),
                },
                None => FieldDescriptor {
                    name: field.name().to_string(),
                    tag,
                    cardinality: if repeated {
                        Cardinality::Repeated
                    } else {
                        Cardinality::Singular
                    },
                    kind: kind_of(field.r#type()),
                    type_name,
                    map_key: None,
                    map_value: None,
                },
            });
        }

        let enums = message
            .enum_type
            .iter()
            .map(|e| self.convert_enum(e))
            .collect::<Result<Vec<_>, _>>()?;
        self.messages.push(MessageDescriptor {
            name: name.clone(),
            fields,
            enums,
        });

        for nested in &message.nested_type {
            self.convert_message(Some(&name), nested)?;
        }
        Ok(())
    }
}

fn is_map_entry(message: &DescriptorProto) -> bool {
    message
        .options
        .as_ref()
        .is_some_and(|options| options.map_entry())
}

fn kind_of(ty: Type) -> Kind {
    match ty {
        Type::Double => Kind::Float64,
        Type::Float => Kind::Float32,
        Type::Int64 => Kind::Int64,
        Type::Uint64 => Kind::Uint64,
        Type::Int32 => Kind::Int32,
        Type::Fixed64 => Kind::Fixed64,
        Type::Fixed32 => Kind::Fixed32,
        Type::Bool => Kind::Bool,
        Type::String => Kind::String,
        Type::Group => Kind::Group,
        Type::Message => Kind::Message,
        Type::Bytes => Kind::Bytes,
        Type::Uint32 => Kind::Uint32,
        Type::Enum => Kind::Enum,
        Type::Sfixed32 => Kind::Sfixed32,
        Type::Sfixed64 => Kind::Sfixed64,
        Type::Sint32 => Kind::Sint32,
        Type::Sint64 => Kind::Sint64,
    }
}
