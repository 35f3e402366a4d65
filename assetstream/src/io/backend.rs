//! File backend types and traits
//!
//! `FileStream` does not talk to the operating system directly. It asks a
//! `FileBackend` for a handle and moves bytes through the `FileHandle` trait.
//! Two backends ship with the crate:
//!
//! - [`StdFs`]: the host filesystem via `std::fs`
//! - [`MemFs`](super::memfs::MemFs): a shared in-memory file store

use std::io::SeekFrom;

/// Mode for opening a file
///
/// `READ_ONLY` and `READ_WRITE` require the file to exist. `CREATE` creates a
/// missing file and implies write access; it combines with `READ_WRITE`:
///
/// ```
/// use assetstream::io::OpenMode;
///
/// let mode = OpenMode::READ_WRITE | OpenMode::CREATE;
/// assert!(mode.is_writable());
/// assert!(mode.creates());
/// assert!(!OpenMode::READ_ONLY.is_writable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    write: bool,
    create: bool,
}

impl OpenMode {
    /// Read existing file, error if not found
    pub const READ_ONLY: Self = Self {
        write: false,
        create: false,
    };
    /// Read and write existing file, error if not found
    pub const READ_WRITE: Self = Self {
        write: true,
        create: false,
    };
    /// Open existing file or create an empty one, writable
    pub const CREATE: Self = Self {
        write: true,
        create: true,
    };

    #[must_use]
    pub fn is_writable(self) -> bool {
        self.write
    }

    #[must_use]
    pub fn creates(self) -> bool {
        self.create
    }
}

impl std::ops::BitOr for OpenMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            write: self.write || rhs.write,
            create: self.create || rhs.create,
        }
    }
}

/// Origin of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Begin,
    Current,
    End,
}

impl SeekMode {
    /// Combine with an offset into a `SeekFrom`.
    ///
    /// Returns `None` for a negative offset relative to the beginning.
    #[must_use]
    pub fn to_seek_from(self, offset: i64) -> Option<SeekFrom> {
        match self {
            Self::Begin => u64::try_from(offset).ok().map(SeekFrom::Start),
            Self::Current => Some(SeekFrom::Current(offset)),
            Self::End => Some(SeekFrom::End(offset)),
        }
    }
}

/// An open file
pub trait FileHandle {
    /// Read into `buf`; `Ok(0)` at end of file.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Write from `buf`; may write fewer bytes than given.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// Move the position; returns the new absolute position.
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64>;

    fn flush(&mut self) -> std::io::Result<()>;

    /// Current length of the file in bytes
    fn size(&self) -> std::io::Result<u64>;
}

/// Trait for file storage backends
///
/// Each file is identified by a string path.
pub trait FileBackend {
    type Handle: FileHandle;

    /// Open a file at path with given mode.
    ///
    /// - `READ_ONLY` / `READ_WRITE`: error of kind `NotFound` if missing
    /// - `CREATE`: creates an empty file if missing, keeps existing contents
    fn open(&self, path: &str, mode: OpenMode) -> std::io::Result<Self::Handle>;

    fn exists(&self, path: &str) -> bool;
}

/// Host filesystem backend
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileBackend for StdFs {
    type Handle = std::fs::File;

    fn open(&self, path: &str, mode: OpenMode) -> std::io::Result<std::fs::File> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(mode.is_writable())
            .create(mode.creates())
            .truncate(false)
            .open(path)
    }

    fn exists(&self, path: &str) -> bool {
        std::path::Path::new(path).is_file()
    }
}

impl FileHandle for std::fs::File {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        std::io::Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write(self, buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        std::io::Seek::seek(self, pos)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::Write::flush(self)
    }

    fn size(&self) -> std::io::Result<u64> {
        self.metadata().map(|m| m.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_combines_with_read_write() {
        assert_eq!(OpenMode::READ_WRITE | OpenMode::CREATE, OpenMode::CREATE);
        assert_eq!(
            OpenMode::READ_ONLY | OpenMode::READ_WRITE,
            OpenMode::READ_WRITE
        );
    }

    #[test]
    fn test_seek_mode_rejects_negative_begin() {
        assert_eq!(SeekMode::Begin.to_seek_from(-1), None);
        assert_eq!(SeekMode::Begin.to_seek_from(4), Some(SeekFrom::Start(4)));
        assert_eq!(SeekMode::End.to_seek_from(-2), Some(SeekFrom::End(-2)));
    }
}
