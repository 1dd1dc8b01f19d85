//! Droid image metadata
//!
//! Every droid image ships a `metadata.yml` describing the product it tests
//! and what the pod needs at runtime: environment variables and secret files
//! to mount.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading image metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid droid metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Contents of `metadata.yml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroidMetadata {
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub product: String,

    /// Whether the pod needs the artifacts storage mounted
    #[serde(default)]
    pub storage: bool,

    #[serde(default)]
    pub environments: Vec<EnvironmentDefinition>,

    #[serde(default)]
    pub secret_files: Vec<SecretFileDefinition>,
}

/// Environment variable to set on the pod
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDefinition {
    pub name: String,

    /// How `value` is interpreted, e.g. a literal or a secret reference
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub value: String,
}

/// Product secret to mount as a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretFileDefinition {
    pub path: String,
    pub secret_key: String,
}

impl DroidMetadata {
    /// Parses metadata from YAML text
    pub fn parse(yaml: &str) -> Result<Self, MetadataError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads metadata from a `metadata.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Secret key mounted at `path`, if any
    pub fn secret_for(&self, path: &str) -> Option<&str> {
        self.secret_files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.secret_key.as_str())
    }
}
