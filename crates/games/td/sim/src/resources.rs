//! Loading of catalogs, maps and configs.
//!
//! Resources are JSON documents addressed by a relative path. A registry
//! document ([`REGISTRY_PATH`]) maps numeric type ids to such paths.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::any::type_name;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const REGISTRY_PATH: &str = "ResourceReg.json";

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read resource `{path}` as {type_name}: {source}")]
    Io {
        path: String,
        type_name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse resource `{path}` as {type_name}: {source}")]
    Parse {
        path: String,
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("no resource registered for type id {type_id} (wanted {type_name})")]
    UnknownTypeId {
        type_id: u32,
        type_name: &'static str,
    },
}

impl ResourceError {
    pub fn path(&self) -> Option<&str> {
        match self {
            ResourceError::Io { path, .. } | ResourceError::Parse { path, .. } => Some(path),
            ResourceError::UnknownTypeId { .. } => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceError::Io { type_name, .. }
            | ResourceError::Parse { type_name, .. }
            | ResourceError::UnknownTypeId { type_name, .. } => type_name,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegistryEntry {
    pub typeid: u32,
    pub path: String,
}

/// Type id to resource path table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "Vec<RegistryEntry>")]
pub struct ResourceRegistry {
    paths: HashMap<u32, String>,
}

impl From<Vec<RegistryEntry>> for ResourceRegistry {
    fn from(entries: Vec<RegistryEntry>) -> Self {
        Self {
            paths: entries.into_iter().map(|e| (e.typeid, e.path)).collect(),
        }
    }
}

impl ResourceRegistry {
    pub fn resource_path(&self, type_id: u32) -> Option<&str> {
        self.paths.get(&type_id).map(String::as_str)
    }
}

/// Read access to resource documents, with typed loading on top.
pub trait ResourceProvider {
    fn read_to_string(&self, path: &str) -> io::Result<String>;

    fn load_resource<T: DeserializeOwned>(&self, path: &str) -> Result<T, ResourceError> {
        let text = self.read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_string(),
            type_name: type_name::<T>(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ResourceError::Parse {
            path: path.to_string(),
            type_name: type_name::<T>(),
            source,
        })
    }

    fn load_resource_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ResourceError> {
        self.load_resource::<Vec<T>>(path)
    }

    fn load_resource_by_type_id<T: DeserializeOwned>(
        &self,
        type_id: u32,
    ) -> Result<T, ResourceError> {
        let registry: ResourceRegistry = self.load_resource(REGISTRY_PATH)?;
        let path = registry
            .resource_path(type_id)
            .ok_or(ResourceError::UnknownTypeId {
                type_id,
                type_name: type_name::<T>(),
            })?;
        self.load_resource(path)
    }
}

/// Resources read from files under a root directory.
#[derive(Clone, Debug)]
pub struct JsonResourceProvider {
    root: PathBuf,
}

impl JsonResourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceProvider for JsonResourceProvider {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// Resources held in memory, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryResourceProvider {
    documents: HashMap<String, String>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert(path, json);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, json: impl Into<String>) {
        self.documents.insert(path.into(), json.into());
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::MonsterTemplate;

    fn provider() -> MemoryResourceProvider {
        MemoryResourceProvider::new()
            .with(
                "monsters/MonstersList.json",
                r#"[{ "kind": "Goblin", "health": 10, "speed": 2.0, "reward": 5 }]"#,
            )
            .with(
                "monsters/Orc.json",
                r#"{ "kind": "Orc", "health": 30, "speed": 1.0, "reward": 15 }"#,
            )
            .with(REGISTRY_PATH, r#"[{ "typeid": 2, "path": "monsters/Orc.json" }]"#)
            .with("broken.json", "{ not json")
    }

    #[test]
    fn test_loads_list() {
        let list: Vec<MonsterTemplate> = provider()
            .load_resource_list("monsters/MonstersList.json")
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, "Goblin");
    }

    #[test]
    fn test_loads_by_type_id() {
        let orc: MonsterTemplate = provider().load_resource_by_type_id(2).unwrap();
        assert_eq!(orc.health, 30);

        let err = provider()
            .load_resource_by_type_id::<MonsterTemplate>(9)
            .unwrap_err();
        assert!(matches!(err, ResourceError::UnknownTypeId { type_id: 9, .. }));
    }

    #[test]
    fn test_missing_resource_names_path_and_type() {
        let err = provider()
            .load_resource::<MonsterTemplate>("monsters/Dragon.json")
            .unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
        assert_eq!(err.path(), Some("monsters/Dragon.json"));
        assert!(err.type_name().ends_with("MonsterTemplate"));
    }

    #[test]
    fn test_malformed_resource_is_a_parse_error() {
        let err = provider()
            .load_resource::<MonsterTemplate>("broken.json")
            .unwrap_err();
        assert!(matches!(err, ResourceError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
