use hkv_types::SchemaFile;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

pub fn parse_schema(text: &str) -> Result<SchemaFile, serde_yml::Error> {
    serde_yml::from_str(text)
}

/* Load a single YAML schema document from disk */
pub fn load_schema_file(path: &Path) -> Result<SchemaFile, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkv_types::{Cardinality, Kind};

    #[test]
    fn parses_fields_with_defaults() {
        let schema = parse_schema(
            r#"
schema:
  package: game
enums:
  - name: Gender
    values: { UNKNOWN: 0, MALE: 1, FEMALE: 2 }
messages:
  - name: User
    fields:
      - { name: id, tag: 1, kind: uint64 }
      - { name: ratio, tag: 2, kind: double }
      - { name: tags, tag: 3, cardinality: repeated, kind: string }
      - { name: gender, tag: 4, kind: enum, type-name: Gender }
      - { name: scores, tag: 5, cardinality: map, kind: message, map-key: string, map-value: int32 }
"#,
        )
        .unwrap();

        assert_eq!(schema.schema.package, "game");
        let values: Vec<_> = schema.enums[0].values.keys().cloned().collect();
        assert_eq!(values, ["UNKNOWN", "MALE", "FEMALE"]);

        let fields = &schema.messages[0].fields;
        assert_eq!(fields[0].cardinality, Cardinality::Singular);
        assert_eq!(fields[1].kind, Kind::Float64);
        assert_eq!(fields[2].cardinality, Cardinality::Repeated);
        assert_eq!(fields[3].type_name.as_deref(), Some("Gender"));
        assert_eq!(fields[4].map_key, Some(Kind::String));
        assert_eq!(fields[4].map_value, Some(Kind::Int32));
    }

    #[test]
    fn unsupported_protobuf_kinds_still_parse() {
        let schema = parse_schema(
            "schema: { package: p }\nmessages:\n  - name: M\n    fields:\n      - { name: a, tag: 1, kind: sint64 }\n",
        )
        .unwrap();
        assert_eq!(schema.messages[0].fields[0].kind, Kind::Sint64);
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "schema: [").unwrap();
        let err = load_schema_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Yaml { .. }));
        assert!(err.to_string().contains("bad.yaml"));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            load_schema_file(&missing),
            Err(LoadError::Io { .. })
        ));
    }
}
