//! protoc plugin protocol.
//!
//! Turns a `CodeGeneratorRequest` into a `CodeGeneratorResponse`. Failures
//! are reported through the response's `error` field, never by exit status.

use crate::codegen::RustCodeGeneratorOptions;
use crate::schema::descriptor::{file_to_schema, package_of};
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use std::collections::HashSet;
use tracing::debug;

/// Parses `runtime_crate=...,file_suffix=...`.
pub fn parse_parameter(parameter: &str) -> Result<RustCodeGeneratorOptions, String> {
    let mut options = RustCodeGeneratorOptions::default();
    for item in parameter.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| format!("plugin parameter {:?} is not key=value", item))?;
        match key.trim() {
            "runtime_crate" => options.runtime_crate = value.trim().to_string(),
            "file_suffix" => options.file_suffix = value.trim().to_string(),
            other => return Err(format!("unknown plugin parameter {:?}", other)),
        }
    }
    Ok(options)
}

pub fn run(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };
    match generate_files(request) {
        Ok(files) => response.file = files,
        Err(err) => response.error = Some(err),
    }
    response
}

fn generate_files(request: &CodeGeneratorRequest) -> Result<Vec<File>, String> {
    let options = parse_parameter(request.parameter())?;

    /* Units are per package, so every file of a requested package is included */
    let requested: HashSet<&str> = request.file_to_generate.iter().map(String::as_str).collect();
    let packages: HashSet<String> = request
        .proto_file
        .iter()
        .filter(|file| requested.contains(file.name()))
        .map(package_of)
        .collect();

    let mut schemas = Vec::new();
    for file in &request.proto_file {
        if packages.contains(&package_of(file)) {
            schemas.push(file_to_schema(file).map_err(|e| e.to_string())?);
        }
    }
    debug!(files = schemas.len(), packages = packages.len(), "plugin request");

    let units = crate::generate(schemas, &options).map_err(|e| e.to_string())?;
    Ok(units
        .into_iter()
        .map(|unit| File {
            name: Some(unit.file_name),
            content: Some(unit.content),
            ..Default::default()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};

    fn proto(name: &str, package: &str, message: &str, ty: Type) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.into()),
            package: Some(package.into()),
            message_type: vec![DescriptorProto {
                name: Some(message.into()),
                field: vec![FieldDescriptorProto {
                    name: Some("id".into()),
                    number: Some(1),
                    label: Some(Label::Optional as i32),
                    r#type: Some(ty as i32),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn parameters() {
        let options = parse_parameter("runtime_crate=crate::rt, file_suffix=.rs").unwrap();
        assert_eq!(options.runtime_crate, "crate::rt");
        assert_eq!(options.file_suffix, ".rs");
        assert_eq!(parse_parameter("").unwrap(), RustCodeGeneratorOptions::default());
        assert!(parse_parameter("color=blue").is_err());
        assert!(parse_parameter("runtime_crate").is_err());
    }

    #[test]
    fn one_file_per_requested_package() {
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".into()],
            proto_file: vec![
                proto("a.proto", "game.v1", "User", Type::Uint64),
                proto("b.proto", "game.v1", "Item", Type::String),
                proto("c.proto", "other", "Unused", Type::Bool),
            ],
            ..Default::default()
        };
        let response = run(&request);
        assert_eq!(response.error, None);
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name(), "game_v1.hkv.rs");
        let content = response.file[0].content();
        assert!(content.contains("pub struct User {"));
        assert!(content.contains("pub struct Item {"));
        assert!(!content.contains("Unused"));
    }

    #[test]
    fn errors_go_into_the_response() {
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".into()],
            proto_file: vec![proto("a.proto", "p", "M", Type::Sint32)],
            ..Default::default()
        };
        let response = run(&request);
        assert!(response.file.is_empty());
        assert!(response.error.unwrap().contains("not supported"));
    }
}
