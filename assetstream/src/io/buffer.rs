//! Growable byte buffer with independent read and write cursors
//!
//! A `ByteBuffer` either owns its storage (growable, mutable) or borrows a
//! caller-owned slice (fixed size, read-only view). The borrowed mode carries
//! the caller's lifetime, so a view can never outlive the memory it wraps.
//!
//! # Cursors
//!
//! ```text
//!  0        read_offset           size      write_offset     capacity
//!  ├────────────┼──────────────────┤──────────────┼──────────────┤
//!  │  consumed  │  readable bytes  │                             │
//! ```
//!
//! - `read()` never reads past `size`
//! - `write()` places bytes at `write_offset` and extends `size` if needed
//! - the two cursors move independently of each other
//!
//! Slices returned by `data()` and `as_slice()` borrow the buffer, so they
//! cannot be held across a call that may reallocate (`write`, `set_size`,
//! `set_capacity`).

use crate::error::{to_embedded_kind, ErrorKind};

/// Error type for buffer operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer wraps borrowed memory and cannot change size or contents
    Immutable,
    /// Growing the storage failed
    OutOfMemory { requested: usize },
    /// Fewer bytes remain than a typed extraction needs; nothing was consumed
    Exhausted { needed: usize, available: usize },
    /// The bytes do not decode to the requested value
    InvalidData(String),
}

impl BufferError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Immutable => ErrorKind::NotSupported,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::Exhausted { .. } => ErrorKind::Io,
            Self::InvalidData(_) => ErrorKind::BadParameter,
        }
    }
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immutable => write!(f, "Buffer error: buffer is an immutable view"),
            Self::OutOfMemory { requested } => {
                write!(f, "Buffer error: cannot allocate {requested} bytes")
            }
            Self::Exhausted { needed, available } => write!(
                f,
                "Buffer error: need {needed} bytes, only {available} available"
            ),
            Self::InvalidData(msg) => write!(f, "Buffer error: invalid data: {msg}"),
        }
    }
}

impl std::error::Error for BufferError {}

impl embedded_io::Error for BufferError {
    fn kind(&self) -> embedded_io::ErrorKind {
        to_embedded_kind(BufferError::kind(self))
    }
}

#[derive(Clone)]
enum Storage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

/// Byte container with separate read and write cursors
///
/// # Example
///
/// ```
/// use assetstream::io::ByteBuffer;
///
/// let mut buffer = ByteBuffer::new();
/// buffer.write(b"hello").unwrap();
///
/// let mut out = [0u8; 3];
/// assert_eq!(buffer.read(&mut out), 3);
/// assert_eq!(&out, b"hel");
/// assert_eq!(buffer.remaining(), 2);
/// ```
#[derive(Clone)]
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
    size: usize,
    read_offset: usize,
    write_offset: usize,
}

impl ByteBuffer<'static> {
    /// Create a new empty buffer with no storage
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            size: 0,
            read_offset: 0,
            write_offset: 0,
        }
    }

    /// Create an owned buffer of `capacity` zeroed bytes.
    ///
    /// Both `size` and `capacity` equal `capacity` afterwards.
    ///
    /// # Errors
    /// `OutOfMemory` if the allocation fails; no buffer is produced.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| BufferError::OutOfMemory {
                requested: capacity,
            })?;
        bytes.resize(capacity, 0);
        Ok(Self {
            storage: Storage::Owned(bytes),
            size: capacity,
            read_offset: 0,
            write_offset: 0,
        })
    }

    /// Take ownership of `bytes`; all of them count as written.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let size = bytes.len();
        Self {
            storage: Storage::Owned(bytes),
            size,
            read_offset: 0,
            write_offset: 0,
        }
    }
}

impl<'a> ByteBuffer<'a> {
    /// Wrap caller-owned memory as an immutable view. Nothing is copied.
    #[must_use]
    pub fn borrowed(data: &'a [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(data),
            size: data.len(),
            read_offset: 0,
            write_offset: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage().len()
    }

    #[must_use]
    pub fn is_mutable(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    #[must_use]
    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    #[must_use]
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Bytes left between the read cursor and `size`
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.size.saturating_sub(self.read_offset)
    }

    /// The logical contents, `[0, size)`
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage()[..self.size]
    }

    /// Bytes from `offset` up to `size`.
    ///
    /// Returns `None` when `offset >= size`, including `offset == size`.
    #[must_use]
    pub fn data(&self, offset: usize) -> Option<&[u8]> {
        if offset < self.size {
            Some(&self.storage()[offset..self.size])
        } else {
            None
        }
    }

    /// Mutable bytes from `offset` up to `size`; `None` for views.
    #[must_use]
    pub fn data_mut(&mut self, offset: usize) -> Option<&mut [u8]> {
        let size = self.size;
        match &mut self.storage {
            Storage::Owned(bytes) if offset < size => Some(&mut bytes[offset..size]),
            _ => None,
        }
    }

    /// Copy of the logical contents
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(mut bytes) => {
                bytes.truncate(self.size);
                bytes
            }
            Storage::Borrowed(data) => data[..self.size].to_vec(),
        }
    }

    /// Grow the storage to at least `capacity` bytes, preserving contents.
    ///
    /// A request at or below the current capacity succeeds without change.
    ///
    /// # Errors
    /// - `Immutable` for borrowed views
    /// - `OutOfMemory` if the allocation fails; the buffer is left unchanged
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), BufferError> {
        let bytes = self.owned_mut()?;
        if capacity <= bytes.len() {
            return Ok(());
        }
        let additional = capacity - bytes.len();
        if bytes.try_reserve(additional).is_err() {
            log::warn!(
                "buffer.set_capacity: cannot grow from {} to {capacity} bytes",
                bytes.len()
            );
            return Err(BufferError::OutOfMemory {
                requested: capacity,
            });
        }
        bytes.resize(capacity, 0);
        Ok(())
    }

    /// Set the logical size, growing the capacity first if needed.
    ///
    /// The read cursor is clamped to the new size; the write cursor is kept.
    ///
    /// # Errors
    /// Same as [`ByteBuffer::set_capacity`].
    pub fn set_size(&mut self, size: usize) -> Result<(), BufferError> {
        self.owned_mut()?;
        self.set_capacity(size)?;
        self.size = size;
        self.read_offset = self.read_offset.min(size);
        Ok(())
    }

    /// Write `data` at the write cursor, growing the storage when needed.
    ///
    /// Returns the number of bytes written, which is always `data.len()`.
    ///
    /// # Errors
    /// - `Immutable` for borrowed views; nothing is written
    /// - `OutOfMemory` if growing fails; nothing is written
    pub fn write(&mut self, data: &[u8]) -> Result<usize, BufferError> {
        self.owned_mut()?;
        let start = self.write_offset;
        let end = start
            .checked_add(data.len())
            .ok_or(BufferError::OutOfMemory {
                requested: usize::MAX,
            })?;
        if end > self.capacity() {
            self.set_capacity(end)?;
        }
        let bytes = self.owned_mut()?;
        bytes[start..end].copy_from_slice(data);
        self.size = self.size.max(end);
        self.write_offset = end;
        Ok(data.len())
    }

    /// Read into `dest`, never past `size`.
    ///
    /// Returns the number of bytes copied: `min(dest.len(), remaining())`,
    /// zero once the read cursor reached `size`.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.remaining());
        let start = self.read_offset;
        dest[..count].copy_from_slice(&self.storage()[start..start + count]);
        self.read_offset += count;
        count
    }

    /// Append up to `len` readable bytes of `source` into this buffer.
    ///
    /// Moves BOTH cursors: this buffer's write cursor and the read cursor of
    /// `source`, each by the number of bytes transferred.
    ///
    /// # Errors
    /// Same as [`ByteBuffer::write`]; on error neither cursor moves.
    pub fn write_from(
        &mut self,
        source: &mut ByteBuffer<'_>,
        len: usize,
    ) -> Result<usize, BufferError> {
        let count = len.min(source.remaining());
        let start = source.read_offset;
        let written = self.write(&source.storage()[start..start + count])?;
        source.read_offset += written;
        Ok(written)
    }

    /// Move up to `len` readable bytes of this buffer into `dest`.
    ///
    /// Moves BOTH cursors: this buffer's read cursor and the write cursor of
    /// `dest`, each by the number of bytes transferred.
    ///
    /// # Errors
    /// Same as [`ByteBuffer::write`] on `dest`; on error neither cursor moves.
    pub fn read_into(
        &mut self,
        dest: &mut ByteBuffer<'_>,
        len: usize,
    ) -> Result<usize, BufferError> {
        let count = len.min(self.remaining());
        let start = self.read_offset;
        let written = dest.write(&self.storage()[start..start + count])?;
        self.read_offset += written;
        Ok(written)
    }

    /// Reset size and both cursors to zero.
    ///
    /// With `full`, an owned buffer also releases its storage (capacity 0).
    /// Views keep their borrowed memory.
    pub fn clear(&mut self, full: bool) {
        self.size = 0;
        self.read_offset = 0;
        self.write_offset = 0;
        if full {
            if let Storage::Owned(bytes) = &mut self.storage {
                *bytes = Vec::new();
            }
        }
    }

    /// Move the read cursor if `offset <= size`; returns the previous offset
    /// whether or not the cursor moved.
    pub fn set_read_offset(&mut self, offset: usize) -> usize {
        let previous = self.read_offset;
        if offset <= self.size {
            self.read_offset = offset;
        }
        previous
    }

    /// Move the write cursor if `offset <= capacity`; returns the previous
    /// offset whether or not the cursor moved.
    pub fn set_write_offset(&mut self, offset: usize) -> usize {
        let previous = self.write_offset;
        if offset <= self.capacity() {
            self.write_offset = offset;
        }
        previous
    }

    fn storage(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(bytes) => bytes,
            Storage::Borrowed(data) => data,
        }
    }

    fn owned_mut(&mut self) -> Result<&mut Vec<u8>, BufferError> {
        match &mut self.storage {
            Storage::Owned(bytes) => Ok(bytes),
            Storage::Borrowed(_) => Err(BufferError::Immutable),
        }
    }
}

impl Default for ByteBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ByteBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ByteBuffer(size={}, capacity={}, read={}, write={}, mutable={})",
            self.size,
            self.capacity(),
            self.read_offset,
            self.write_offset,
            self.is_mutable()
        )
    }
}

impl embedded_io::ErrorType for ByteBuffer<'_> {
    type Error = BufferError;
}

impl embedded_io::Read for ByteBuffer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(ByteBuffer::read(self, buf))
    }
}

impl embedded_io::Write for ByteBuffer<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        ByteBuffer::write(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = ByteBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.is_mutable());
    }

    #[test]
    fn test_with_capacity_presizes() {
        let buffer = ByteBuffer::with_capacity(16).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.read_offset(), 0);
        assert_eq!(buffer.write_offset(), 0);
        assert_eq!(buffer.as_slice(), &[0u8; 16]);
    }

    #[test]
    fn test_write_then_read() {
        let mut buffer = ByteBuffer::new();
        assert_eq!(buffer.write(b"hello").unwrap(), 5);
        assert_eq!(buffer.write(b" world").unwrap(), 6);

        let mut out = [0u8; 11];
        assert_eq!(buffer.read(&mut out), 11);
        assert_eq!(&out, b"hello world");
        assert_eq!(buffer.read(&mut out), 0);
    }

    #[test]
    fn test_data_rejects_offset_at_size() {
        let mut buffer = ByteBuffer::new();
        buffer.write(b"abc").unwrap();
        assert_eq!(buffer.data(0), Some(&b"abc"[..]));
        assert_eq!(buffer.data(2), Some(&b"c"[..]));
        assert_eq!(buffer.data(3), None);
        assert_eq!(buffer.data(100), None);
    }

    #[test]
    fn test_data_mut_only_for_owned() {
        let mut owned = ByteBuffer::from_vec(b"abc".to_vec());
        owned.data_mut(1).unwrap()[0] = b'X';
        assert_eq!(owned.as_slice(), b"aXc");

        let backing = [1u8, 2, 3];
        let mut view = ByteBuffer::borrowed(&backing);
        assert!(view.data_mut(0).is_none());
    }

    #[test]
    fn test_set_size_clamps_read_cursor() {
        let mut buffer = ByteBuffer::from_vec(vec![7; 10]);
        buffer.set_read_offset(8);
        buffer.set_write_offset(9);
        buffer.set_size(4).unwrap();
        assert_eq!(buffer.read_offset(), 4);
        assert_eq!(buffer.write_offset(), 9);
        assert_eq!(buffer.capacity(), 10);
    }

    #[test]
    fn test_embedded_io_traits() {
        use embedded_io::{Read, Write};

        let mut buffer = ByteBuffer::new();
        buffer.write_all(b"abcdef").unwrap();
        let mut out = [0u8; 4];
        buffer.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"abcd");
    }

    #[test]
    fn test_debug_format() {
        let buffer = ByteBuffer::from_vec(vec![1, 2]);
        assert_eq!(
            format!("{buffer:?}"),
            "ByteBuffer(size=2, capacity=2, read=0, write=0, mutable=true)"
        );
    }
}
