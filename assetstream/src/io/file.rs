//! Sequential file access through `ByteBuffer`s
//!
//! `FileStream` moves bytes between an open file and caller-provided
//! buffers. It keeps no reference to those buffers after a call returns.
//! Cursor movement matches the in-memory buffer-to-buffer transfers:
//!
//! - `read(dest, n)` advances the write cursor of `dest`
//! - `write(src, n)` advances the read cursor of `src`
//!
//! Typed values go through a scratch buffer owned by the stream.

use std::io::SeekFrom;

use super::backend::{FileBackend, FileHandle, OpenMode, SeekMode, StdFs};
use super::buffer::{BufferError, ByteBuffer};
use super::typed::Streamable;
use crate::error::{io_error_kind, ErrorKind};

const CHUNK_SIZE: usize = 4096;

/// Errors that can occur in file stream operations
#[derive(Debug)]
pub enum FileError {
    /// Path was not found and creation was not requested
    NotFound(String),
    /// The stream is closed
    NotOpen(String),
    /// `open` on a stream that is already open
    AlreadyOpen(String),
    /// Creating the file failed
    Create {
        path: String,
        source: std::io::Error,
    },
    /// Any other failure of the underlying handle
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The buffer side of a transfer failed
    Buffer(BufferError),
}

impl FileError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotOpen(_) => ErrorKind::NotSupported,
            Self::AlreadyOpen(_) => ErrorKind::AlreadyExists,
            Self::Create { .. } => ErrorKind::Io,
            Self::Io { source, .. } => io_error_kind(source.kind()),
            Self::Buffer(e) => e.kind(),
        }
    }

    fn io(path: &str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "File not found: {path}"),
            Self::NotOpen(path) => write!(f, "File not open: {path}"),
            Self::AlreadyOpen(path) => write!(f, "File already open: {path}"),
            Self::Create { path, source } => write!(f, "Cannot create {path}: {source}"),
            Self::Io { path, source } => write!(f, "I/O error on {path}: {source}"),
            Self::Buffer(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create { source, .. } | Self::Io { source, .. } => Some(source),
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for FileError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

/// A file opened through a `FileBackend`
///
/// # Example
///
/// ```no_run
/// use assetstream::io::{ByteBuffer, FileStream, OpenMode};
///
/// let mut stream = FileStream::new("assets/level1.bin");
/// stream.open(OpenMode::READ_ONLY).unwrap();
///
/// let mut buffer = ByteBuffer::new();
/// stream.read_to_end(&mut buffer).unwrap();
/// let version: u32 = buffer.get().unwrap();
/// ```
pub struct FileStream<B: FileBackend = StdFs> {
    path: String,
    backend: B,
    handle: Option<B::Handle>,
    scratch: ByteBuffer<'static>,
}

impl FileStream<StdFs> {
    /// Create a closed stream for a host filesystem path
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_backend(path, StdFs)
    }
}

impl<B: FileBackend> FileStream<B> {
    /// Create a closed stream for `path` on `backend`
    #[must_use]
    pub fn with_backend(path: impl Into<String>, backend: B) -> Self {
        Self {
            path: path.into(),
            backend,
            handle: None,
            scratch: ByteBuffer::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the backing file exists; does not open it
    #[must_use]
    pub fn exists(&self) -> bool {
        self.backend.exists(&self.path)
    }

    /// Open the file.
    ///
    /// # Errors
    /// - `AlreadyOpen` if the stream holds a handle
    /// - `NotFound` if the file is missing and `mode` does not create
    /// - `Create` if creation was requested but failed
    /// - `Io` for other failures
    pub fn open(&mut self, mode: OpenMode) -> Result<(), FileError> {
        if self.handle.is_some() {
            return Err(FileError::AlreadyOpen(self.path.clone()));
        }
        match self.backend.open(&self.path, mode) {
            Ok(handle) => {
                log::debug!("file.open: {} ({mode:?})", self.path);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) if mode.creates() => Err(FileError::Create {
                path: self.path.clone(),
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileError::NotFound(self.path.clone()))
            }
            Err(e) => Err(FileError::io(&self.path, e)),
        }
    }

    /// Close the stream.
    /// Can be called multiple times.
    /// "drop" will call "close" automatically.
    ///
    /// # Errors
    /// Returns an error if flushing pending writes fails; the handle is
    /// released anyway.
    pub fn close(&mut self) -> Result<(), FileError> {
        if let Some(mut handle) = self.handle.take() {
            log::debug!("file.close: {}", self.path);
            handle.flush().map_err(|e| FileError::io(&self.path, e))?;
        }
        Ok(())
    }

    /// Read up to `len` bytes from the file into `dest` at its write cursor.
    ///
    /// Returns the number of bytes transferred, less than `len` only at end
    /// of file.
    ///
    /// # Errors
    /// - `NotOpen` if the stream is closed
    /// - `Buffer(Immutable)` if `dest` is a view; nothing is read
    /// - `Io` if the read fails; bytes read before the failure stay in `dest`
    pub fn read(&mut self, dest: &mut ByteBuffer<'_>, len: usize) -> Result<usize, FileError> {
        if !dest.is_mutable() {
            return Err(FileError::Buffer(BufferError::Immutable));
        }
        let path = &self.path;
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileError::NotOpen(path.clone()))?;

        let mut chunk = [0u8; CHUNK_SIZE];
        let mut total = 0;
        while total < len {
            let want = (len - total).min(CHUNK_SIZE);
            let count = match handle.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(count) => count,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FileError::io(path, e)),
            };
            dest.write(&chunk[..count])?;
            total += count;
        }
        Ok(total)
    }

    /// Write up to `len` readable bytes of `src` into the file.
    ///
    /// The read cursor of `src` advances by the number of bytes written,
    /// also when the write fails part way.
    ///
    /// # Errors
    /// - `NotOpen` if the stream is closed
    /// - `Io` if the handle rejects the write (e.g. opened read-only)
    pub fn write(&mut self, src: &mut ByteBuffer<'_>, len: usize) -> Result<usize, FileError> {
        let path = &self.path;
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileError::NotOpen(path.clone()))?;

        let start = src.read_offset();
        let Some(pending) = src.data(start) else {
            return Ok(0);
        };
        let pending = &pending[..len.min(pending.len())];

        let mut written = 0;
        let mut failure = None;
        while written < pending.len() {
            match handle.write(&pending[written..]) {
                Ok(0) => break,
                Ok(count) => written += count,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    failure = Some(FileError::io(path, e));
                    break;
                }
            }
        }
        src.set_read_offset(start + written);
        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    /// Read the rest of the file into `dest`.
    ///
    /// # Errors
    /// Same as [`FileStream::read`].
    pub fn read_to_end(&mut self, dest: &mut ByteBuffer<'_>) -> Result<usize, FileError> {
        let mut total = 0;
        loop {
            let count = self.read(dest, CHUNK_SIZE)?;
            if count == 0 {
                return Ok(total);
            }
            total += count;
        }
    }

    /// Move the file position; returns the position before the move.
    ///
    /// # Errors
    /// - `NotOpen` if the stream is closed
    /// - `Io` (`InvalidInput`) for a negative offset from the beginning or a
    ///   target before the start of the file
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64, FileError> {
        let path = &self.path;
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileError::NotOpen(path.clone()))?;

        let previous = handle
            .seek(SeekFrom::Current(0))
            .map_err(|e| FileError::io(path, e))?;
        let target = mode.to_seek_from(offset).ok_or_else(|| {
            FileError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("negative offset {offset} from beginning"),
                ),
            )
        })?;
        handle.seek(target).map_err(|e| FileError::io(path, e))?;
        Ok(previous)
    }

    /// Current absolute position.
    ///
    /// # Errors
    /// `NotOpen` if the stream is closed, `Io` if the handle fails.
    pub fn tell(&mut self) -> Result<u64, FileError> {
        let path = &self.path;
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileError::NotOpen(path.clone()))?;
        handle
            .seek(SeekFrom::Current(0))
            .map_err(|e| FileError::io(path, e))
    }

    /// Length of the open file in bytes.
    ///
    /// # Errors
    /// `NotOpen` if the stream is closed, `Io` if the handle fails.
    pub fn size(&self) -> Result<u64, FileError> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| FileError::NotOpen(self.path.clone()))?;
        handle.size().map_err(|e| FileError::io(&self.path, e))
    }

    /// # Errors
    /// `NotOpen` if the stream is closed, `Io` if the handle fails.
    pub fn flush(&mut self) -> Result<(), FileError> {
        let path = &self.path;
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileError::NotOpen(path.clone()))?;
        handle.flush().map_err(|e| FileError::io(path, e))
    }

    /// Write `value` at the file position.
    ///
    /// # Errors
    /// Same as [`FileStream::write`]; a short write is reported as `Io`
    /// (`WriteZero`).
    pub fn put<T: Streamable>(&mut self, value: T) -> Result<usize, FileError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear(false);
        let result = scratch
            .put(value)
            .map_err(FileError::from)
            .and_then(|_| self.write_exact(&mut scratch));
        self.scratch = scratch;
        result
    }

    /// Read a value at the file position.
    ///
    /// # Errors
    /// `Buffer(Exhausted)` if the file ends early; the file position is
    /// restored so nothing is consumed.
    pub fn get<T: Streamable>(&mut self) -> Result<T, FileError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear(false);
        let result = self.read_exact(&mut scratch, T::SIZE).and_then(|()| {
            scratch.get::<T>().map_err(FileError::from)
        });
        self.scratch = scratch;
        result
    }

    /// Write a `u32` length-prefixed UTF-8 string.
    ///
    /// # Errors
    /// Same as [`FileStream::put`].
    pub fn put_str(&mut self, value: &str) -> Result<usize, FileError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear(false);
        let result = scratch
            .put_str(value)
            .map_err(FileError::from)
            .and_then(|_| self.write_exact(&mut scratch));
        self.scratch = scratch;
        result
    }

    /// Read a string written by [`FileStream::put_str`].
    ///
    /// # Errors
    /// `Buffer(Exhausted)` or `Buffer(InvalidData)`; in both cases the file
    /// position is restored.
    pub fn get_string(&mut self) -> Result<String, FileError> {
        let start = self.tell()?;
        let result = self.get::<u32>().and_then(|len| {
            let mut scratch = std::mem::take(&mut self.scratch);
            scratch.clear(false);
            scratch.put(len)?;
            let body = self.read_exact(&mut scratch, len as usize);
            let decoded = body.and_then(|()| scratch.get_string().map_err(FileError::from));
            self.scratch = scratch;
            decoded
        });
        if result.is_err() {
            self.seek(i64::try_from(start).unwrap_or(i64::MAX), SeekMode::Begin)?;
        }
        result
    }

    fn write_exact(&mut self, scratch: &mut ByteBuffer<'static>) -> Result<usize, FileError> {
        let expected = scratch.remaining();
        let written = self.write(scratch, expected)?;
        if written < expected {
            return Err(FileError::io(
                &self.path,
                std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    format!("wrote {written} of {expected} bytes"),
                ),
            ));
        }
        Ok(written)
    }

    fn read_exact(&mut self, scratch: &mut ByteBuffer<'static>, len: usize) -> Result<(), FileError> {
        let count = self.read(scratch, len)?;
        if count < len {
            let back = i64::try_from(count).unwrap_or(i64::MAX);
            self.seek(-back, SeekMode::Current)?;
            return Err(FileError::Buffer(BufferError::Exhausted {
                needed: len,
                available: count,
            }));
        }
        Ok(())
    }
}

impl<B: FileBackend> Drop for FileStream<B> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<B: FileBackend> std::fmt::Debug for FileStream<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
