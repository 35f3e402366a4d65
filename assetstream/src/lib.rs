//! Byte buffers, file streams and cooperatively loaded resource groups.
//!
//! - [`io`]: growable byte buffers, typed little-endian encoding, file
//!   streams over pluggable backends
//! - [`resource`]: resources, groups of resources, and their loader context
//! - [`error`]: error kinds shared by every module

pub mod error;
pub mod io;
pub mod resource;

// Re-export error kinds for convenience
pub use error::ErrorKind;

// Re-export io types for convenience
pub use io::{
    BufferError, ByteBuffer, FileBackend, FileError, FileStream, MemFs, OpenMode, SeekMode, StdFs,
    Streamable,
};

// Re-export resource types for convenience
pub use resource::{
    into_handle, BlobResource, DefinitionNode, DefinitionTree, GroupState, LoadPolicy,
    LoaderConfig, Progress, Resource, ResourceContext, ResourceError, ResourceEvent,
    ResourceEvents, ResourceGroup, ResourceHandle, ResourceRegistry, ResourceState,
};
