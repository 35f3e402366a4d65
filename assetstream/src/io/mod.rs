//! I/O module for assetstream
//!
//! Contains the byte buffer, its typed encoding, and file streaming.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  FileStream (sequential file I/O)   │
//! │  - read(dest buffer) / write(src)   │
//! │  - seek / tell                      │
//! │  - typed put/get via scratch buffer │
//! └─────────────────────────────────────┘
//!          ▲                    │
//!          │ FileHandle         │ moves bytes into/out of
//!          │                    ▼
//! ┌──────────────────┐   ┌─────────────────────────────┐
//! │  FileBackend     │   │  ByteBuffer                 │
//! │  - open(path)    │   │  - read/write cursors       │
//! └──────────────────┘   │  - owned or borrowed view   │
//!      ▲         ▲       │  - put/get (typed.rs)       │
//!      │         │       └─────────────────────────────┘
//!    StdFs     MemFs
//! ```

pub mod backend;
pub mod buffer;
pub mod file;
pub mod memfs;
pub mod typed;

pub use backend::{FileBackend, FileHandle, OpenMode, SeekMode, StdFs};
pub use buffer::{BufferError, ByteBuffer};
pub use file::{FileError, FileStream};
pub use memfs::{MemFile, MemFs, MAX_FILE_SIZE};
pub use typed::{Streamable, MAX_SCALAR_SIZE};
