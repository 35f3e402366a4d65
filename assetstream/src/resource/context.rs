//! Resource construction and loader settings
//!
//! A group does not know concrete resource types. It asks its
//! `ResourceContext` to build a resource for each child node of its
//! definition, and reads the load policy and the event channel from it.

use serde::Deserialize;
use std::collections::HashMap;

use super::blob::{BlobResource, BLOB_TYPE};
use super::definition::read_all;
use super::events::ResourceEvents;
use super::{into_handle, ResourceError, ResourceHandle};
use crate::io::FileBackend;

/// How many pending resources one `ResourceGroup::load` call may step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Step every resource on each call
    #[default]
    All,
    /// Stop at the first resource that reports `Pending`
    OnePerCall,
}

/// Loader settings
///
/// Read from JSON; missing fields take their defaults:
///
/// ```json
/// { "load_policy": "one_per_call", "blob_chunk_size": 4096 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub load_policy: LoadPolicy,
    /// Bytes a blob reads per `load()` step; 0 reads the whole file at once
    pub blob_chunk_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_policy: LoadPolicy::All,
            blob_chunk_size: 64 * 1024,
        }
    }
}

impl LoaderConfig {
    /// # Errors
    /// `BadDefinition` if the JSON is malformed.
    pub fn from_json(text: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(text)
            .map_err(|e| ResourceError::BadDefinition(format!("loader config: {e}")))
    }

    /// # Errors
    /// `BadDefinition` if reading fails or the JSON is malformed.
    pub fn from_reader(reader: impl embedded_io::Read) -> Result<Self, ResourceError> {
        let bytes = read_all(reader)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ResourceError::BadDefinition(format!("loader config: {e}")))
    }
}

/// Services a group needs from its owner
pub trait ResourceContext {
    /// Build an empty resource of the given type for the named group.
    ///
    /// `None` if the type is unknown.
    fn create_resource(&self, type_name: &str, group: &str) -> Option<ResourceHandle>;

    fn load_policy(&self) -> LoadPolicy;

    fn events(&self) -> &ResourceEvents;
}

/// Constructor for one resource type; receives the group name
pub type ResourceConstructor = Box<dyn Fn(&str) -> ResourceHandle>;

/// Registry mapping type names to resource constructors
pub struct ResourceRegistry {
    constructors: HashMap<String, ResourceConstructor>,
    config: LoaderConfig,
    events: ResourceEvents,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            constructors: HashMap::new(),
            config,
            events: ResourceEvents::default(),
        }
    }

    /// Register a constructor, replacing any previous one for the type
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        constructor: impl Fn(&str) -> ResourceHandle + 'static,
    ) {
        let type_name = type_name.into();
        if self
            .constructors
            .insert(type_name.clone(), Box::new(constructor))
            .is_some()
        {
            log::debug!("registry.register: replaced constructor for '{type_name}'");
        }
    }

    /// Register the `blob` type reading through `backend`
    pub fn register_blob<B: FileBackend + Clone + 'static>(&mut self, backend: B) {
        let chunk_size = self.config.blob_chunk_size;
        self.register(BLOB_TYPE, move |_group| {
            into_handle(BlobResource::new(backend.clone(), chunk_size))
        });
    }

    #[must_use]
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl ResourceContext for ResourceRegistry {
    fn create_resource(&self, type_name: &str, group: &str) -> Option<ResourceHandle> {
        let constructor = self.constructors.get(type_name)?;
        Some(constructor(group))
    }

    fn load_policy(&self) -> LoadPolicy {
        self.config.load_policy
    }

    fn events(&self) -> &ResourceEvents {
        &self.events
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.constructors.keys().collect();
        types.sort();
        f.debug_struct("ResourceRegistry")
            .field("types", &types)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
