//! In-memory file backend
//!
//! `MemFs` is a name → bytes store shared by all its clones. Open handles
//! share the file contents with the store, so a write through one handle is
//! visible to every later `get_file` or `open`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::SeekFrom;
use std::sync::Arc;

use super::backend::{FileBackend, FileHandle, OpenMode};

type SharedFile = Arc<Mutex<Vec<u8>>>;

/// Largest size a write may grow an in-memory file to
pub const MAX_FILE_SIZE: u64 = 1 << 32;

/// Shared in-memory file store
///
/// # Example
///
/// ```
/// use assetstream::io::{ByteBuffer, FileStream, MemFs, OpenMode};
///
/// let fs = MemFs::new();
/// fs.add_file("data/a.bin", b"abc".to_vec());
///
/// let mut stream = FileStream::with_backend("data/a.bin", fs.clone());
/// stream.open(OpenMode::READ_ONLY).unwrap();
/// let mut buffer = ByteBuffer::new();
/// assert_eq!(stream.read(&mut buffer, 16).unwrap(), 3);
/// assert_eq!(buffer.as_slice(), b"abc");
/// ```
#[derive(Clone, Default)]
pub struct MemFs {
    files: Arc<Mutex<HashMap<String, SharedFile>>>,
}

impl MemFs {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn add_file(&self, path: impl Into<String>, bytes: Vec<u8>) {
        let mut files = self.files.lock();
        if files
            .insert(path.into(), Arc::new(Mutex::new(bytes)))
            .is_some()
        {
            log::debug!("memfs.add_file: replaced an existing file");
        }
    }

    /// Copy of the file contents
    #[must_use]
    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock();
        files.get(path).map(|file| file.lock().clone())
    }

    /// Remove a file; returns `true` if it existed.
    ///
    /// Handles that are already open keep their contents.
    pub fn remove(&self, path: &str) -> bool {
        self.files.lock().remove(path).is_some()
    }

    /// List paths under a directory prefix.
    ///
    /// If the prefix does not end with '/', one is added for matching.
    #[must_use]
    pub fn list(&self, dir_name: &str) -> Vec<String> {
        let prefix = if dir_name.ends_with('/') {
            dir_name.to_string()
        } else {
            format!("{dir_name}/")
        };

        let files = self.files.lock();
        let mut paths: Vec<String> = files
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    /// Remove all files
    pub fn clear(&self) {
        self.files.lock().clear();
    }
}

impl std::fmt::Debug for MemFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemFs")
            .field("files", &self.files.lock().len())
            .finish()
    }
}

impl FileBackend for MemFs {
    type Handle = MemFile;

    fn open(&self, path: &str, mode: OpenMode) -> std::io::Result<MemFile> {
        let mut files = self.files.lock();

        let data = if let Some(file) = files.get(path) {
            Arc::clone(file)
        } else if mode.creates() {
            let file = Arc::new(Mutex::new(Vec::new()));
            files.insert(path.to_string(), Arc::clone(&file));
            file
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Path not found: {path}"),
            ));
        };

        Ok(MemFile {
            data,
            pos: 0,
            writable: mode.is_writable(),
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }
}

/// Handle to a `MemFs` file
#[derive(Debug)]
pub struct MemFile {
    data: SharedFile,
    pos: u64,
    writable: bool,
}

impl MemFile {
    fn pos_usize(&self) -> std::io::Result<usize> {
        usize::try_from(self.pos).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "position overflow")
        })
    }
}

impl FileHandle for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let pos = self.pos_usize()?;
        let data = self.data.lock();
        if pos >= data.len() {
            return Ok(0);
        }
        let count = buf.len().min(data.len() - pos);
        buf[..count].copy_from_slice(&data[pos..pos + count]);
        drop(data);
        self.pos += count as u64;
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !self.writable {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file opened read-only",
            ));
        }
        let pos = self.pos_usize()?;
        let end = pos
            .checked_add(buf.len())
            .filter(|end| *end as u64 <= MAX_FILE_SIZE)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "write past maximum file size",
                )
            })?;
        let mut data = self.data.lock();
        if end > data.len() {
            let grow = end - data.len();
            data.try_reserve(grow).map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::OutOfMemory, "cannot grow file")
            })?;
            data.resize(end, 0);
        }
        data[pos..end].copy_from_slice(buf);
        drop(data);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let len = self.data.lock().len() as u64;
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
        };
        let Some(target) = target else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        };
        self.pos = target;
        Ok(target)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // No-op for in-memory storage
        Ok(())
    }

    fn size(&self) -> std::io::Result<u64> {
        Ok(self.data.lock().len() as u64)
    }
}
