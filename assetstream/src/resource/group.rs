//! Resource groups
//!
//! A group is read from one definition node:
//!
//! - attribute `name` (required) and `overridable` (optional boolean)
//! - `dependency` children naming other groups
//! - any other child is a resource whose type is the child's node name
//!
//! Resources keep their definition order. Loading walks them in that order,
//! skipping manual resources and resources that are already loaded.

use std::sync::Arc;
use tracing::{debug, warn};

use super::context::{LoadPolicy, ResourceContext};
use super::definition::{bool_attribute, DefinitionNode};
use super::events::ResourceEvent;
use super::{Progress, ResourceError, ResourceHandle, ResourceState};

/// Node name of a dependency child
pub const DEPENDENCY_NODE: &str = "dependency";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Unloaded,
    /// Some resources reported `Pending`; call `load()` again
    Loading,
    Loaded,
    Unloading,
}

#[derive(Clone)]
struct ResourceEntry {
    type_name: String,
    name: String,
    handle: ResourceHandle,
    /// Stepped by this group's current load; only these are unwound
    stepped: bool,
}

impl ResourceEntry {
    fn new(handle: ResourceHandle) -> Self {
        let (type_name, name) = {
            let resource = handle.lock();
            (resource.type_name().to_string(), resource.name().to_string())
        };
        Self {
            type_name,
            name,
            handle,
            stepped: false,
        }
    }

    fn matches(&self, type_name: &str, name: &str) -> bool {
        self.type_name == type_name && self.name == name
    }
}

pub struct ResourceGroup {
    name: String,
    path: String,
    overridable: bool,
    state: GroupState,
    resources: Vec<ResourceEntry>,
    dependencies: Vec<String>,
    context: Arc<dyn ResourceContext>,
}

impl ResourceGroup {
    /// Create an empty, unnamed group; fill it with `create()`
    #[must_use]
    pub fn new(context: Arc<dyn ResourceContext>) -> Self {
        Self::named(context, "", "")
    }

    /// Create an empty group without a definition
    #[must_use]
    pub fn named(
        context: Arc<dyn ResourceContext>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            overridable: false,
            state: GroupState::Unloaded,
            resources: Vec::new(),
            dependencies: Vec::new(),
            context,
        }
    }

    /// Populate the group from a definition node read from `path`.
    ///
    /// Stops at the first failing child. Children processed before the
    /// failure stay in the group.
    ///
    /// # Errors
    /// - `BadDefinition`: missing name, malformed attribute, or a resource
    ///   rejected its node
    /// - `UnknownType`: no constructor for a child's type
    pub fn create(&mut self, path: &str, node: &dyn DefinitionNode) -> Result<(), ResourceError> {
        self.path = path.to_string();

        let name = node.attribute("name").unwrap_or_default();
        if name.is_empty() {
            return Err(ResourceError::BadDefinition(format!(
                "group in '{path}' has no name"
            )));
        }
        self.name = name.to_string();
        self.overridable = bool_attribute(node, "overridable")?;

        for child in node.children() {
            if child.name() == DEPENDENCY_NODE {
                let dependency = child.attribute("name").unwrap_or_default();
                if dependency.is_empty() {
                    return Err(ResourceError::BadDefinition(format!(
                        "dependency without name in group '{}'",
                        self.name
                    )));
                }
                self.add_dependency(dependency);
                continue;
            }

            let type_name = child.name();
            let handle = self
                .context
                .create_resource(type_name, &self.name)
                .ok_or_else(|| ResourceError::UnknownType(type_name.to_string()))?;
            handle.lock().create(path, child).map_err(|e| {
                ResourceError::BadDefinition(format!(
                    "<{type_name}> in group '{}': {e}",
                    self.name
                ))
            })?;
            self.add_resource(handle);
        }

        debug!(
            group = %self.name,
            path = %self.path,
            resources = self.resources.len(),
            dependencies = self.dependencies.len(),
            "group created"
        );
        Ok(())
    }

    /// Load or continue loading the group's resources.
    ///
    /// Returns `Pending` while any resource is still loading. On a hard
    /// failure the resources this group stepped since loading began are
    /// unloaded again and the error is returned. Shared resources that were
    /// already loaded by another group are left alone.
    ///
    /// # Errors
    /// `AlreadyLoaded` if the group is loaded, or the failing resource's error.
    pub fn load(&mut self) -> Result<Progress, ResourceError> {
        if self.state == GroupState::Loaded {
            return Err(ResourceError::AlreadyLoaded(self.name.clone()));
        }
        if self.state == GroupState::Unloaded {
            for entry in &mut self.resources {
                entry.stepped = false;
            }
        }
        self.state = GroupState::Loading;
        let policy = self.context.load_policy();

        let mut pending = 0usize;
        for index in 0..self.resources.len() {
            let outcome = {
                let mut resource = self.resources[index].handle.lock();
                if resource.is_manual() || resource.state() == ResourceState::Loaded {
                    continue;
                }
                resource.load()
            };

            self.resources[index].stepped = true;
            let entry = &self.resources[index];
            match outcome {
                Ok(Progress::Complete) => {
                    debug!(group = %self.name, resource = %entry.name, "resource loaded");
                    self.emit(ResourceEvent::ResourceLoaded {
                        group: self.name.clone(),
                        type_name: entry.type_name.clone(),
                        name: entry.name.clone(),
                    });
                }
                Ok(Progress::Pending) => {
                    pending += 1;
                    if policy == LoadPolicy::OnePerCall {
                        return Ok(Progress::Pending);
                    }
                }
                Err(e) => {
                    warn!(
                        group = %self.name,
                        resource = %entry.name,
                        error = %e,
                        "resource failed to load, unloading group"
                    );
                    self.unload_resources(true);
                    self.state = GroupState::Unloaded;
                    return Err(e);
                }
            }
        }

        if pending > 0 {
            debug!(group = %self.name, pending, "group still loading");
            return Ok(Progress::Pending);
        }

        self.state = GroupState::Loaded;
        debug!(group = %self.name, "group loaded");
        self.emit(ResourceEvent::GroupLoaded {
            group: self.name.clone(),
        });
        Ok(Progress::Complete)
    }

    /// Unload every non-manual resource.
    ///
    /// A resource that fails to unload is logged and skipped.
    ///
    /// # Errors
    /// `NotLoaded` if the group is not fully loaded.
    pub fn unload(&mut self) -> Result<(), ResourceError> {
        if self.state != GroupState::Loaded {
            return Err(ResourceError::NotLoaded(self.name.clone()));
        }
        self.state = GroupState::Unloading;
        self.unload_resources(false);
        self.state = GroupState::Unloaded;

        debug!(group = %self.name, "group unloaded");
        self.emit(ResourceEvent::GroupUnloaded {
            group: self.name.clone(),
        });
        Ok(())
    }

    /// Abandon a load in progress, unloading what this group has stepped so far.
    ///
    /// # Errors
    /// `NotLoaded` if the group is not in the `Loading` state.
    pub fn cancel_load(&mut self) -> Result<(), ResourceError> {
        if self.state != GroupState::Loading {
            return Err(ResourceError::NotLoaded(self.name.clone()));
        }
        debug!(group = %self.name, "load cancelled");
        self.unload_resources(true);
        self.state = GroupState::Unloaded;
        Ok(())
    }

    /// Unload non-manual resources; with `stepped_only`, just those stepped
    /// by the current load.
    fn unload_resources(&mut self, stepped_only: bool) {
        for index in 0..self.resources.len() {
            let entry = &self.resources[index];
            if stepped_only && !entry.stepped {
                continue;
            }
            let unloaded = {
                let mut resource = entry.handle.lock();
                if resource.is_manual() || resource.state() == ResourceState::Unloaded {
                    continue;
                }
                if let Err(e) = resource.unload() {
                    warn!(
                        group = %self.name,
                        resource = %entry.name,
                        error = %e,
                        "resource failed to unload"
                    );
                }
                resource.state() == ResourceState::Unloaded
            };

            if unloaded {
                self.emit(ResourceEvent::ResourceUnloaded {
                    group: self.name.clone(),
                    type_name: entry.type_name.clone(),
                    name: entry.name.clone(),
                });
            }
        }
        for entry in &mut self.resources {
            entry.stepped = false;
        }
    }

    /// Merge another group's resources into this one.
    ///
    /// A resource with the same type and name is replaced by the incoming
    /// one; others are appended. Both groups then share the incoming
    /// resource objects.
    ///
    /// # Errors
    /// - `NotOverridable`: this group does not allow overrides
    /// - `SameSource`: `other` was read from this group's own path
    pub fn override_by(&mut self, other: &ResourceGroup) -> Result<(), ResourceError> {
        if !self.overridable {
            return Err(ResourceError::NotOverridable(self.name.clone()));
        }
        if other.path == self.path {
            return Err(ResourceError::SameSource(other.path.clone()));
        }

        for incoming in &other.resources {
            let existing = self
                .resources
                .iter()
                .position(|entry| entry.matches(&incoming.type_name, &incoming.name));
            if let Some(index) = existing {
                warn!(
                    group = %self.name,
                    resource = %incoming.name,
                    type_name = %incoming.type_name,
                    from = %other.path,
                    "resource overridden"
                );
                let entry = &mut self.resources[index];
                entry.handle = Arc::clone(&incoming.handle);
                entry.stepped = false;
            } else {
                self.resources.push(ResourceEntry {
                    stepped: false,
                    ..incoming.clone()
                });
            }
        }
        Ok(())
    }

    /// Release the group's resources.
    ///
    /// # Errors
    /// `StillLoaded` if the group is loaded or partially loaded.
    pub fn destroy(&mut self) -> Result<(), ResourceError> {
        if self.state != GroupState::Unloaded {
            return Err(ResourceError::StillLoaded(self.name.clone()));
        }
        debug!(group = %self.name, resources = self.resources.len(), "group destroyed");
        self.resources.clear();
        self.dependencies.clear();
        Ok(())
    }

    /// Append a resource; its type and name are read once, here.
    pub fn add_resource(&mut self, handle: ResourceHandle) {
        self.resources.push(ResourceEntry::new(handle));
    }

    /// Record a dependency; duplicates are ignored.
    ///
    /// Returns `true` if the dependency was new.
    pub fn add_dependency(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_dependency(&name) {
            warn!(group = %self.name, dependency = %name, "duplicate dependency");
            return false;
        }
        self.dependencies.push(name);
        true
    }

    /// First resource with the given type and name
    #[must_use]
    pub fn resource(&self, type_name: &str, name: &str) -> Option<ResourceHandle> {
        self.resources
            .iter()
            .find(|entry| entry.matches(type_name, name))
            .map(|entry| Arc::clone(&entry.handle))
    }

    /// Resources of a type in definition order; an empty type returns all
    #[must_use]
    pub fn resources(&self, type_name: &str) -> Vec<ResourceHandle> {
        self.resources
            .iter()
            .filter(|entry| type_name.is_empty() || entry.type_name == type_name)
            .map(|entry| Arc::clone(&entry.handle))
            .collect()
    }

    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    #[must_use]
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.iter().any(|dependency| dependency == name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn state(&self) -> GroupState {
        self.state
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == GroupState::Loaded
    }

    #[must_use]
    pub fn is_overridable(&self) -> bool {
        self.overridable
    }

    pub fn set_overridable(&mut self, overridable: bool) {
        self.overridable = overridable;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn emit(&self, event: ResourceEvent) {
        self.context.events().emit(event);
    }
}

impl Drop for ResourceGroup {
    fn drop(&mut self) {
        if self.state != GroupState::Unloaded {
            warn!(
                group = %self.name,
                state = ?self.state,
                "group dropped without being unloaded"
            );
        }
    }
}

impl std::fmt::Debug for ResourceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resources: Vec<String> = self
            .resources
            .iter()
            .map(|entry| format!("{}:{}", entry.type_name, entry.name))
            .collect();
        f.debug_struct("ResourceGroup")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("overridable", &self.overridable)
            .field("resources", &resources)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
