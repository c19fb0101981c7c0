/* Generator configuration file */

use crate::codegen::{rust, RustCodeGeneratorOptions};
use hkv_runtime::ConnectOptions;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const PASSWORD_ENV: &str = "HKV_STORE_PASSWORD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub runtime_crate: String,
    pub file_suffix: String,
    pub store: StoreConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            runtime_crate: rust::DEFAULT_RUNTIME_CRATE.to_string(),
            file_suffix: rust::DEFAULT_FILE_SUFFIX.to_string(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct StoreConfig {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<u32>,
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            username: None,
            password: None,
            database: None,
            timeout_ms: 2000,
        }
    }
}

impl GeneratorConfig {
    /* No path means built-in defaults */
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_yml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(text)
    }

    pub fn codegen_options(&self) -> RustCodeGeneratorOptions {
        RustCodeGeneratorOptions {
            runtime_crate: self.runtime_crate.clone(),
            file_suffix: self.file_suffix.clone(),
        }
    }
}

impl StoreConfig {
    /// Environment password wins over the file so secrets can stay out of it.
    pub fn connect_options(&self, env_password: Option<String>) -> ConnectOptions {
        ConnectOptions {
            address: self.address.clone(),
            username: self.username.clone(),
            password: env_password.or_else(|| self.password.clone()),
            database: self.database,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = GeneratorConfig::parse("runtime-crate: crate::rt\nstore:\n  database: 2\n").unwrap();
        assert_eq!(config.runtime_crate, "crate::rt");
        assert_eq!(config.file_suffix, ".hkv.rs");
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.store.database, Some(2));
        assert_eq!(config.store.address, "127.0.0.1:6379");
        assert_eq!(GeneratorConfig::parse("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored_but_bad_types_fail() {
        assert!(GeneratorConfig::parse("extra: 1\n").is_ok());
        assert!(GeneratorConfig::parse("store:\n  timeout-ms: soon\n").is_err());
    }

    #[test]
    fn env_password_overrides_file() {
        let store = StoreConfig {
            password: Some("file".into()),
            timeout_ms: 50,
            ..StoreConfig::default()
        };
        let options = store.connect_options(Some("env".into()));
        assert_eq!(options.password.as_deref(), Some("env"));
        assert_eq!(options.timeout, Duration::from_millis(50));
        assert_eq!(store.connect_options(None).password.as_deref(), Some("file"));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hkv.yaml");
        std::fs::write(&path, "output-dir: out\nfile-suffix: .rs\n").unwrap();
        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.codegen_options().file_suffix, ".rs");

        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            GeneratorConfig::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(GeneratorConfig::load(None).unwrap(), GeneratorConfig::default());
    }
}
