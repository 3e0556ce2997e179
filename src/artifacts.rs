//! Artifact Registry - Predefined Packages
//!
//! Named `artifact` stanzas that tasks pull in with `package(id)`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::stanzas::ArtifactOptions;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read artifacts from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact definition in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One artifact file on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDefinition {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub options: Option<IndexMap<String, String>>,
}

impl From<ArtifactDefinition> for ArtifactOptions {
    fn from(def: ArtifactDefinition) -> Self {
        Self {
            source: Some(def.source),
            destination: def.destination,
            mode: def.mode,
            options: def.options,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    artifacts: BTreeMap<String, ArtifactOptions>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir`. A missing directory is an empty registry.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        if !dir.exists() {
            debug!(dir = %dir.display(), "artifact directory missing, registry is empty");
            return Ok(registry);
        }

        let io_err = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = vec![];
        for entry in fs::read_dir(dir).map_err(io_err)? {
            paths.push(entry.map_err(io_err)?.path());
        }
        paths.sort();

        for path in paths {
            if path.extension().map_or(true, |e| e != "json") {
                warn!(path = %path.display(), "skipping non-JSON file in artifact directory");
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let def: ArtifactDefinition = serde_json::from_str(&content)
                .map_err(|source| RegistryError::Parse { path: path.clone(), source })?;
            registry.register(def.id.clone(), def.into());
        }

        debug!(count = registry.artifacts.len(), "loaded artifacts");
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&ArtifactOptions> {
        self.artifacts.get(id)
    }

    /// All artifacts, ordered by id.
    pub fn list(&self) -> Vec<(&str, &ArtifactOptions)> {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    pub fn register(&mut self, id: impl Into<String>, artifact: ArtifactOptions) {
        self.artifacts.insert(id.into(), artifact);
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let registry = ArtifactRegistry::load_from_dir(&dir.path().join("nope")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_json_and_skip_others() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("consul.json"),
            r#"{"id": "consul", "source": "https://example.com/consul.zip", "destination": "local/bin"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not an artifact").unwrap();

        let registry = ArtifactRegistry::load_from_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        let consul = registry.get("consul").unwrap();
        assert_eq!(consul.source.as_deref(), Some("https://example.com/consul.zip"));
        assert_eq!(consul.destination.as_deref(), Some("local/bin"));
        assert!(consul.mode.is_none());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), r#"{"id": "x"}"#).unwrap();
        let err = ArtifactRegistry::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }

    #[test]
    fn test_list_sorted_by_id() {
        let mut registry = ArtifactRegistry::new();
        registry.register("zeta", ArtifactOptions::default());
        registry.register("alpha", ArtifactOptions::default());
        let ids: Vec<_> = registry.list().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
