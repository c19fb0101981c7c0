/* Schema IR builder
 *
 * Normalizes descriptor documents into one `SchemaIr` per package. Every
 * structural check happens here so the resolver and the emitter only ever
 * see well-formed input. */

use hkv_types::{Cardinality, EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, SchemaFile};
use indexmap::IndexMap;
use serde_derive::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Largest field number protobuf allows.
pub const MAX_TAG: u32 = 536_870_911;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema document has an empty package name")]
    MissingPackage,

    #[error("{message}.{field}: tag 0 is not allowed")]
    ZeroTag { message: String, field: String },

    #[error("{message}.{field}: tag {tag} is outside 1..={max}", max = MAX_TAG)]
    TagOutOfRange {
        message: String,
        field: String,
        tag: u32,
    },

    #[error("{message}: tag {tag} used by both {first} and {second}")]
    DuplicateTag {
        message: String,
        tag: u32,
        first: String,
        second: String,
    },

    #[error("{message}: field name {field} declared twice")]
    DuplicateFieldName { message: String, field: String },

    #[error("package {package}: type {name} defined more than once")]
    DuplicateType { package: String, name: String },

    #[error("package {package}: enum {name} redefined with different values")]
    ConflictingEnum { package: String, name: String },

    #[error("enum {name} has no values")]
    EmptyEnum { name: String },

    #[error("enum {name}: value {value} used by both {first} and {second}")]
    DuplicateEnumValue {
        name: String,
        value: i32,
        first: String,
        second: String,
    },

    #[error("{message}.{field}: {kind} field needs a type-name")]
    MissingTypeName {
        message: String,
        field: String,
        kind: Kind,
    },

    #[error("{message}.{field}: type-name {type_name} given for {kind} field")]
    UnexpectedTypeName {
        message: String,
        field: String,
        kind: Kind,
        type_name: String,
    },

    #[error("{message}.{field}: unknown type {type_name}")]
    UnknownType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("{message}.{field}: {type_name} is not of kind {expected}")]
    TypeKindMismatch {
        message: String,
        field: String,
        type_name: String,
        expected: Kind,
    },

    #[error("{message}.{field}: map field needs both map-key and map-value")]
    MapKindsMissing { message: String, field: String },

    #[error("{message}.{field}: map-key/map-value given for a {cardinality} field")]
    UnexpectedMapKinds {
        message: String,
        field: String,
        cardinality: Cardinality,
    },

    #[error("{message}.{field}: map field must declare kind message, found {kind}")]
    MapFieldKind {
        message: String,
        field: String,
        kind: Kind,
    },
}

/// Resolved reference to a type of the same package, by qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case", tag = "category", content = "name")]
pub enum TypeRef {
    Message(String),
    Enum(String),
}

impl TypeRef {
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Message(name) | TypeRef::Enum(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnumInfo {
    /// Qualified within the package, e.g. `User.Role`.
    pub name: String,
    pub values: Vec<(String, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldInfo {
    pub name: String,
    pub tag: u32,
    pub cardinality: Cardinality,
    pub kind: Kind,
    /// Target of an enum/message field, or of a map's enum/message value.
    pub type_ref: Option<TypeRef>,
    pub map_key: Option<Kind>,
    pub map_value: Option<Kind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessageInfo {
    pub name: String,
    pub package: String,
    /// Declaration order.
    pub fields: Vec<FieldInfo>,
    /// Enums declared inside this message, qualified.
    pub enums: Vec<EnumInfo>,
}

impl MessageInfo {
    pub fn field(&self, tag: u32) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

/// All messages of one package plus the package-wide enum table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaIr {
    pub package: String,
    pub messages: Vec<MessageInfo>,
    /// Deduplicated and sorted by name.
    pub enums: Vec<EnumInfo>,
}

impl SchemaIr {
    pub fn message(&self, name: &str) -> Option<&MessageInfo> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.enums.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Message,
    Enum,
}

/// Collects schema documents and groups them by package.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    units: IndexMap<String, Vec<SchemaFile>>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: SchemaFile) -> &mut Self {
        self.units
            .entry(file.schema.package.clone())
            .or_default()
            .push(file);
        self
    }

    pub fn build(self) -> Result<Vec<SchemaIr>, SchemaError> {
        self.units
            .into_iter()
            .map(|(package, files)| build_unit(package, files))
            .collect()
    }
}

fn build_unit(package: String, files: Vec<SchemaFile>) -> Result<SchemaIr, SchemaError> {
    if package.is_empty() {
        return Err(SchemaError::MissingPackage);
    }

    let mut enums: BTreeMap<String, EnumInfo> = BTreeMap::new();
    let mut messages: Vec<&MessageDescriptor> = Vec::new();
    let mut types: HashMap<String, Category> = HashMap::new();

    for file in &files {
        for desc in &file.enums {
            add_enum(&package, desc.name.clone(), desc, &mut enums)?;
        }
        for message in &file.messages {
            for desc in &message.enums {
                add_enum(&package, format!("{}.{}", message.name, desc.name), desc, &mut enums)?;
            }
            messages.push(message);
        }
    }

    for name in enums.keys() {
        types.insert(name.clone(), Category::Enum);
    }
    for message in &messages {
        if types.insert(message.name.clone(), Category::Message).is_some() {
            return Err(SchemaError::DuplicateType {
                package: package.clone(),
                name: message.name.clone(),
            });
        }
    }

    let scope = Scope {
        package: &package,
        types: &types,
    };
    let messages = messages
        .into_iter()
        .map(|message| build_message(&scope, message, &enums))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaIr {
        package,
        messages,
        enums: enums.into_values().collect(),
    })
}

fn add_enum(
    package: &str,
    name: String,
    desc: &EnumDescriptor,
    enums: &mut BTreeMap<String, EnumInfo>,
) -> Result<(), SchemaError> {
    if desc.values.is_empty() {
        return Err(SchemaError::EmptyEnum { name });
    }
    let mut seen: HashMap<i32, &str> = HashMap::new();
    for (symbol, value) in &desc.values {
        if let Some(first) = seen.insert(*value, symbol) {
            return Err(SchemaError::DuplicateEnumValue {
                name,
                value: *value,
                first: first.to_string(),
                second: symbol.clone(),
            });
        }
    }

    let info = EnumInfo {
        name: name.clone(),
        values: desc.values.iter().map(|(k, v)| (k.clone(), *v)).collect(),
    };
    match enums.get(&name) {
        Some(existing) if *existing == info => Ok(()),
        Some(_) => Err(SchemaError::ConflictingEnum {
            package: package.to_string(),
            name,
        }),
        None => {
            enums.insert(name, info);
            Ok(())
        }
    }
}

struct Scope<'a> {
    package: &'a str,
    types: &'a HashMap<String, Category>,
}

impl Scope<'_> {
    /* Innermost scope first: `A.B.ref`, `A.ref`, `ref` */
    fn lookup(&self, message: &str, reference: &str) -> Option<(String, Category)> {
        let reference = reference.strip_prefix('.').unwrap_or(reference);
        let reference = reference
            .strip_prefix(self.package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(reference);

        let mut prefix = Some(message);
        while let Some(scope) = prefix {
            let candidate = format!("{}.{}", scope, reference);
            if let Some(category) = self.types.get(&candidate) {
                return Some((candidate, *category));
            }
            prefix = scope.rfind('.').map(|idx| &scope[..idx]);
        }
        self.types
            .get(reference)
            .map(|category| (reference.to_string(), *category))
    }
}

fn build_message(
    scope: &Scope<'_>,
    message: &MessageDescriptor,
    enums: &BTreeMap<String, EnumInfo>,
) -> Result<MessageInfo, SchemaError> {
    let mut tags: HashMap<u32, &str> = HashMap::new();
    let mut names: HashSet<&str> = HashSet::new();
    let mut fields = Vec::with_capacity(message.fields.len());

    for field in &message.fields {
        let err_ctx = || (message.name.clone(), field.name.clone());
        if field.tag == 0 {
            let (message, field) = err_ctx();
            return Err(SchemaError::ZeroTag { message, field });
        }
        if field.tag > MAX_TAG {
            let (message, field_name) = err_ctx();
            return Err(SchemaError::TagOutOfRange {
                message,
                field: field_name,
                tag: field.tag,
            });
        }
        if let Some(first) = tags.insert(field.tag, &field.name) {
            return Err(SchemaError::DuplicateTag {
                message: message.name.clone(),
                tag: field.tag,
                first: first.to_string(),
                second: field.name.clone(),
            });
        }
        if !names.insert(&field.name) {
            let (message, field) = err_ctx();
            return Err(SchemaError::DuplicateFieldName { message, field });
        }
        fields.push(build_field(scope, &message.name, field)?);
    }

    let prefix = format!("{}.", message.name);
    let nested = enums
        .values()
        .filter(|e| {
            e.name
                .strip_prefix(&prefix)
                .is_some_and(|rest| !rest.contains('.'))
        })
        .cloned()
        .collect();

    Ok(MessageInfo {
        name: message.name.clone(),
        package: scope.package.to_string(),
        fields,
        enums: nested,
    })
}

fn build_field(
    scope: &Scope<'_>,
    message: &str,
    field: &FieldDescriptor,
) -> Result<FieldInfo, SchemaError> {
    let ctx = || (message.to_string(), field.name.clone());

    /* The kind that decides whether a type-name is needed */
    let target_kind = match field.cardinality {
        Cardinality::Map => {
            if field.kind != Kind::Message {
                let (message, field_name) = ctx();
                return Err(SchemaError::MapFieldKind {
                    message,
                    field: field_name,
                    kind: field.kind,
                });
            }
            match (field.map_key, field.map_value) {
                (Some(_), Some(value)) => value,
                _ => {
                    let (message, field) = ctx();
                    return Err(SchemaError::MapKindsMissing { message, field });
                }
            }
        }
        cardinality => {
            if field.map_key.is_some() || field.map_value.is_some() {
                let (message, field) = ctx();
                return Err(SchemaError::UnexpectedMapKinds {
                    message,
                    field,
                    cardinality,
                });
            }
            field.kind
        }
    };

    let type_ref = match (target_kind.is_named(), &field.type_name) {
        (false, None) => None,
        (false, Some(type_name)) => {
            let (message, field) = ctx();
            return Err(SchemaError::UnexpectedTypeName {
                message,
                field,
                kind: target_kind,
                type_name: type_name.clone(),
            });
        }
        (true, None) => {
            let (message, field) = ctx();
            return Err(SchemaError::MissingTypeName {
                message,
                field,
                kind: target_kind,
            });
        }
        (true, Some(type_name)) => {
            let (qualified, category) = scope.lookup(message, type_name).ok_or_else(|| {
                let (message, field) = ctx();
                SchemaError::UnknownType {
                    message,
                    field,
                    type_name: type_name.clone(),
                }
            })?;
            match (target_kind, category) {
                (Kind::Message, Category::Message) => Some(TypeRef::Message(qualified)),
                (Kind::Enum, Category::Enum) => Some(TypeRef::Enum(qualified)),
                _ => {
                    let (message, field) = ctx();
                    return Err(SchemaError::TypeKindMismatch {
                        message,
                        field,
                        type_name: type_name.clone(),
                        expected: target_kind,
                    });
                }
            }
        }
    };

    Ok(FieldInfo {
        name: field.name.clone(),
        tag: field.tag,
        cardinality: field.cardinality,
        kind: field.kind,
        type_ref,
        map_key: field.map_key,
        map_value: field.map_value,
    })
}
