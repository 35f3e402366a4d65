//! Error taxonomy shared by buffers, file streams and resource groups.
//!
//! Every module keeps its own error enum, but each of them reports one of the
//! kinds below through a `kind()` method. Callers that only care about the
//! class of failure (retry later, missing file, bad definition data) match on
//! `ErrorKind` instead of the concrete error.

/// Class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing file, path, or resource type
    NotFound,
    /// Malformed definition data: empty name, unparsable attribute
    BadParameter,
    /// Double load, double unload, duplicate override source
    AlreadyExists,
    /// Mutating an immutable buffer, operation not allowed in this state
    NotSupported,
    /// Allocation or reallocation failure
    OutOfMemory,
    /// Cooperative-yield signal: call again later
    Wait,
    /// Open/seek/read/write failures not otherwise classified
    Io,
}

impl ErrorKind {
    /// `true` for the cooperative-yield kind, which is not a terminal failure.
    #[must_use]
    pub fn is_wait(self) -> bool {
        self == Self::Wait
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(error_kind_to_str(*self))
    }
}

/// Convert `std::io::ErrorKind` to `ErrorKind`
#[must_use]
#[allow(clippy::match_same_arms)] // We explicitly list the kinds we care about
pub fn io_error_kind(kind: std::io::ErrorKind) -> ErrorKind {
    match kind {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
        std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData => {
            ErrorKind::BadParameter
        }
        std::io::ErrorKind::Unsupported => ErrorKind::NotSupported,
        std::io::ErrorKind::OutOfMemory => ErrorKind::OutOfMemory,
        std::io::ErrorKind::WouldBlock => ErrorKind::Wait,
        _ => ErrorKind::Io,
    }
}

/// Convert `ErrorKind` to `embedded_io::ErrorKind`
#[must_use]
pub fn to_embedded_kind(kind: ErrorKind) -> embedded_io::ErrorKind {
    match kind {
        ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
        ErrorKind::BadParameter => embedded_io::ErrorKind::InvalidInput,
        ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
        ErrorKind::NotSupported => embedded_io::ErrorKind::Unsupported,
        ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
        ErrorKind::Wait => embedded_io::ErrorKind::Interrupted,
        ErrorKind::Io => embedded_io::ErrorKind::Other,
    }
}

/// Convert error kind to a static string description
#[must_use]
pub fn error_kind_to_str(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not found",
        ErrorKind::BadParameter => "bad parameter",
        ErrorKind::AlreadyExists => "already exists",
        ErrorKind::NotSupported => "not supported",
        ErrorKind::OutOfMemory => "out of memory",
        ErrorKind::Wait => "wait",
        ErrorKind::Io => "i/o error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kinds_map_to_taxonomy() {
        assert_eq!(io_error_kind(std::io::ErrorKind::NotFound), ErrorKind::NotFound);
        assert_eq!(
            io_error_kind(std::io::ErrorKind::PermissionDenied),
            ErrorKind::Io
        );
        assert_eq!(
            io_error_kind(std::io::ErrorKind::UnexpectedEof),
            ErrorKind::Io
        );
        assert_eq!(io_error_kind(std::io::ErrorKind::WouldBlock), ErrorKind::Wait);
    }

    #[test]
    fn test_embedded_mapping() {
        assert_eq!(
            to_embedded_kind(ErrorKind::NotSupported),
            embedded_io::ErrorKind::Unsupported
        );
        assert_eq!(
            to_embedded_kind(ErrorKind::OutOfMemory),
            embedded_io::ErrorKind::OutOfMemory
        );
    }

    #[test]
    fn test_display_uses_static_table() {
        assert_eq!(ErrorKind::AlreadyExists.to_string(), "already exists");
        assert!(ErrorKind::Wait.is_wait());
        assert!(!ErrorKind::Io.is_wait());
    }
}
