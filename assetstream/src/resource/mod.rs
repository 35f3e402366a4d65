//! Resources and resource groups
//!
//! A `Resource` is one loadable asset (a blob of bytes, an image, a
//! material...). A `ResourceGroup` owns an ordered list of resources and
//! drives their load/unload state machine.
//!
//! ```text
//!              load() ─ Pending          load() ─ Complete
//!  Unloaded ──────────────────► Loading ────────────────────► Loaded
//!     ▲                            │                            │
//!     │      hard failure:         │                            │ unload()
//!     └──── unload what loaded ────┘                            ▼
//!     └───────────────────────────────────────────────────── Unloading
//! ```
//!
//! Loading is cooperative: a resource that needs more time returns
//! `Progress::Pending` and the caller calls `load()` again on a later tick.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::ErrorKind;
use crate::io::{BufferError, FileError};

pub mod blob;
pub mod context;
pub mod definition;
pub mod events;
pub mod group;

pub use blob::{BlobResource, BLOB_TYPE};
pub use context::{LoadPolicy, LoaderConfig, ResourceContext, ResourceRegistry};
pub use definition::{DefinitionNode, DefinitionTree};
pub use events::{ResourceEvent, ResourceEvents};
pub use group::{GroupState, ResourceGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

/// Outcome of a successful `load()` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Fully loaded
    Complete,
    /// Still in progress; call `load()` again later
    Pending,
}

impl Progress {
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// A loadable asset owned by one or more groups
pub trait Resource {
    fn type_name(&self) -> &str;

    fn name(&self) -> &str;

    /// Configure the resource from its definition node.
    ///
    /// `path` is the path of the definition file the node came from.
    fn create(&mut self, path: &str, node: &dyn DefinitionNode) -> Result<(), ResourceError>;

    /// Load, or continue loading.
    fn load(&mut self) -> Result<Progress, ResourceError>;

    fn unload(&mut self) -> Result<(), ResourceError>;

    fn state(&self) -> ResourceState;

    /// Manual resources are skipped by the group's load/unload sweep.
    fn is_manual(&self) -> bool {
        false
    }
}

/// Shared handle to a resource.
///
/// Groups that share a resource through an override hold the same object,
/// so a change made through one group is visible in the other.
pub type ResourceHandle = Arc<Mutex<dyn Resource>>;

/// Wrap a resource in a `ResourceHandle`
pub fn into_handle<R: Resource + 'static>(resource: R) -> ResourceHandle {
    Arc::new(Mutex::new(resource))
}

/// Errors that can occur in resource and group operations
#[derive(Debug)]
pub enum ResourceError {
    /// `load()` on a loaded group
    AlreadyLoaded(String),
    /// `unload()` on a group that is not loaded
    NotLoaded(String),
    /// `destroy()` on a group that still holds loaded resources
    StillLoaded(String),
    /// `override_by()` on a group that is not overridable
    NotOverridable(String),
    /// `override_by()` with a group read from the same path
    SameSource(String),
    /// Malformed definition data
    BadDefinition(String),
    /// No constructor registered for a resource type
    UnknownType(String),
    File(FileError),
    Buffer(BufferError),
    /// Resource-specific failure
    Failed(String),
}

impl ResourceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyLoaded(_) | Self::NotLoaded(_) | Self::SameSource(_) => {
                ErrorKind::AlreadyExists
            }
            Self::StillLoaded(_) | Self::NotOverridable(_) => ErrorKind::NotSupported,
            Self::BadDefinition(_) => ErrorKind::BadParameter,
            Self::UnknownType(_) => ErrorKind::NotFound,
            Self::File(e) => e.kind(),
            Self::Buffer(e) => e.kind(),
            Self::Failed(_) => ErrorKind::Io,
        }
    }
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyLoaded(name) => write!(f, "Group already loaded: {name}"),
            Self::NotLoaded(name) => write!(f, "Group not loaded: {name}"),
            Self::StillLoaded(name) => write!(f, "Group still loaded: {name}"),
            Self::NotOverridable(name) => write!(f, "Group is not overridable: {name}"),
            Self::SameSource(path) => write!(f, "Override source is the group itself: {path}"),
            Self::BadDefinition(msg) => write!(f, "Bad definition: {msg}"),
            Self::UnknownType(type_name) => write!(f, "Unknown resource type: {type_name}"),
            Self::File(e) => write!(f, "{e}"),
            Self::Buffer(e) => write!(f, "{e}"),
            Self::Failed(msg) => write!(f, "Resource failed: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(e) => Some(e),
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FileError> for ResourceError {
    fn from(e: FileError) -> Self {
        Self::File(e)
    }
}

impl From<BufferError> for ResourceError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}
