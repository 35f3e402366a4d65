//! Raw byte resource
//!
//! A blob holds the contents of one file. Definition attributes:
//!
//! - `name` (required)
//! - `file` (required): relative paths resolve against the directory of the
//!   definition file
//! - `manual` (optional boolean)
//!
//! With a non-zero chunk size, each `load()` step reads one chunk and reports
//! `Pending` until the end of the file.

use std::path::Path;

use super::definition::{bool_attribute, required_attribute, DefinitionNode};
use super::{Progress, Resource, ResourceError, ResourceState};
use crate::io::{ByteBuffer, FileBackend, FileStream, OpenMode, StdFs};

/// Type name of blob resources in definitions
pub const BLOB_TYPE: &str = "blob";

pub struct BlobResource<B: FileBackend = StdFs> {
    name: String,
    file: String,
    manual: bool,
    chunk_size: usize,
    backend: B,
    stream: Option<FileStream<B>>,
    data: ByteBuffer<'static>,
    state: ResourceState,
}

impl<B: FileBackend + Clone> BlobResource<B> {
    /// `chunk_size` of 0 reads the whole file in one step
    #[must_use]
    pub fn new(backend: B, chunk_size: usize) -> Self {
        Self {
            name: String::new(),
            file: String::new(),
            manual: false,
            chunk_size,
            backend,
            stream: None,
            data: ByteBuffer::new(),
            state: ResourceState::Unloaded,
        }
    }

    /// Resolved path of the backing file
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Bytes loaded so far
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    fn step(&mut self) -> Result<Progress, ResourceError> {
        if self.stream.is_none() {
            let mut stream = FileStream::with_backend(self.file.clone(), self.backend.clone());
            stream.open(OpenMode::READ_ONLY)?;
            self.data.clear(false);
            self.state = ResourceState::Loading;
            self.stream = Some(stream);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(ResourceError::Failed(format!("{} has no open stream", self.name)));
        };

        let done = if self.chunk_size == 0 {
            stream.read_to_end(&mut self.data)?;
            true
        } else {
            let count = stream.read(&mut self.data, self.chunk_size)?;
            count < self.chunk_size || stream.tell()? >= stream.size()?
        };

        if !done {
            log::trace!("blob.load: {} has {} bytes so far", self.name, self.data.len());
            return Ok(Progress::Pending);
        }

        if let Some(mut stream) = self.stream.take() {
            stream.close()?;
        }
        self.state = ResourceState::Loaded;
        log::debug!("blob.load: {} loaded {} bytes", self.name, self.data.len());
        Ok(Progress::Complete)
    }

    fn reset(&mut self) {
        self.stream = None;
        self.data.clear(true);
        self.state = ResourceState::Unloaded;
    }
}

impl<B: FileBackend + Clone> Resource for BlobResource<B> {
    fn type_name(&self) -> &str {
        BLOB_TYPE
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, path: &str, node: &dyn DefinitionNode) -> Result<(), ResourceError> {
        self.name = required_attribute(node, "name")?.to_string();
        let file = required_attribute(node, "file")?;
        self.manual = bool_attribute(node, "manual")?;

        self.file = match Path::new(path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() && Path::new(file).is_relative() => {
                dir.join(file).to_string_lossy().into_owned()
            }
            _ => file.to_string(),
        };
        Ok(())
    }

    fn load(&mut self) -> Result<Progress, ResourceError> {
        if self.state == ResourceState::Loaded {
            return Ok(Progress::Complete);
        }
        self.step().map_err(|e| {
            log::warn!("blob.load: {} failed: {e}", self.name);
            self.reset();
            e
        })
    }

    fn unload(&mut self) -> Result<(), ResourceError> {
        self.state = ResourceState::Unloading;
        self.reset();
        Ok(())
    }

    fn state(&self) -> ResourceState {
        self.state
    }

    fn is_manual(&self) -> bool {
        self.manual
    }
}

impl<B: FileBackend> std::fmt::Debug for BlobResource<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobResource")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("state", &self.state)
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemFs;
    use crate::resource::DefinitionTree;

    fn blob_node(file: &str) -> DefinitionTree {
        DefinitionTree::new(BLOB_TYPE)
            .with_attribute("name", "b")
            .with_attribute("file", file)
    }

    #[test]
    fn test_file_resolves_against_definition_dir() {
        let mut blob = BlobResource::new(MemFs::new(), 0);
        blob.create("packs/main.json", &blob_node("a.bin")).unwrap();
        assert_eq!(blob.file(), "packs/a.bin");

        let mut blob = BlobResource::new(MemFs::new(), 0);
        blob.create("main.json", &blob_node("a.bin")).unwrap();
        assert_eq!(blob.file(), "a.bin");
    }

    #[test]
    fn test_missing_file_attribute() {
        let mut blob = BlobResource::new(MemFs::new(), 0);
        let node = DefinitionTree::new(BLOB_TYPE).with_attribute("name", "b");
        assert!(blob.create("g.json", &node).is_err());
    }

    #[test]
    fn test_load_missing_file_resets_state() {
        let mut blob = BlobResource::new(MemFs::new(), 0);
        blob.create("g.json", &blob_node("absent.bin")).unwrap();
        let err = blob.load().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert_eq!(blob.state(), ResourceState::Unloaded);
    }

    #[test]
    fn test_chunked_load() {
        let fs = MemFs::new();
        fs.add_file("d/a.bin", b"0123456789".to_vec());
        let mut blob = BlobResource::new(fs, 4);
        blob.create("d/g.json", &blob_node("a.bin")).unwrap();

        assert_eq!(blob.load().unwrap(), Progress::Pending);
        assert_eq!(blob.state(), ResourceState::Loading);
        assert_eq!(blob.data(), b"0123");
        assert_eq!(blob.load().unwrap(), Progress::Pending);
        assert_eq!(blob.load().unwrap(), Progress::Complete);
        assert_eq!(blob.data(), b"0123456789");
        assert_eq!(blob.state(), ResourceState::Loaded);

        blob.unload().unwrap();
        assert!(blob.data().is_empty());
        assert_eq!(blob.state(), ResourceState::Unloaded);
    }
}
