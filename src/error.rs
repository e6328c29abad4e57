// src/error.rs
//! Error types for buffered I/O with conversion support

use std::fmt;
use std::sync::Arc;

/// Errors surfaced by [`Reader`](crate::Reader), [`Writer`](crate::Writer) and
/// the byte-stream capabilities they wrap.
///
/// Errors are cheap to clone: a [`Writer`](crate::Writer) hands the same latched
/// error back on every call, so capability errors are shared behind an `Arc`
/// instead of being rebuilt.
#[derive(Debug, Clone)]
pub enum Error {
    /// The requested record does not fit in the configured buffer capacity
    BufferFull,
    /// `unread_byte` called with no byte to push back
    InvalidUnreadByte,
    /// `unread_rune` called when the previous operation was not `read_rune`
    InvalidUnreadRune,
    /// The sink accepted fewer bytes than offered without reporting an error
    ShortWrite,
    /// The source has no more bytes
    Eof,
    /// The source kept returning zero bytes without an error
    NoProgress,
    /// Error produced by the underlying source or sink, passed through as-is
    Io(Arc<std::io::Error>),
}

impl Error {
    /// Returns `true` for the end-of-stream marker.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Wraps any error as a capability error.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Io(Arc::new(std::io::Error::other(err)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferFull => write!(f, "bufio: buffer full"),
            Self::InvalidUnreadByte => write!(f, "bufio: invalid use of unread_byte"),
            Self::InvalidUnreadRune => write!(f, "bufio: invalid use of unread_rune"),
            Self::ShortWrite => write!(f, "short write"),
            Self::Eof => write!(f, "end of stream"),
            Self::NoProgress => write!(f, "multiple read calls returned no data or error"),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Capability errors compare by identity: two `Io` values are equal only when
/// they share the same underlying error.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(a), Self::Io(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl Eq for Error {}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Convert std::io::Error to Error
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

/// Convert Error to std::io::Error
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Eof => std::io::Error::new(ErrorKind::UnexpectedEof, err),
            Error::ShortWrite => std::io::Error::new(ErrorKind::WriteZero, err),
            Error::InvalidUnreadByte | Error::InvalidUnreadRune => {
                std::io::Error::new(ErrorKind::InvalidInput, err)
            }
            Error::Io(inner) => match Arc::try_unwrap(inner) {
                Ok(io) => io,
                Err(shared) => std::io::Error::new(shared.kind(), Error::Io(shared)),
            },
            _ => std::io::Error::other(err),
        }
    }
}

/// Allow using ? with anyhow::Error
#[cfg(feature = "anyhow")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::other(err)
    }
}

// ============================================================================
// RESULT TYPE ALIASES
// ============================================================================

/// Result type alias for buffered I/O operations
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// EXTENSION TRAIT FOR EASY CONVERSION
// ============================================================================

/// Extension trait for converting Results between different error types
pub trait ResultExt<T> {
    /// Convert to anyhow::Result
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T>;

    /// Convert to io::Result
    fn into_io(self) -> std::io::Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T> {
        self.map_err(anyhow::Error::new)
    }

    fn into_io(self) -> std::io::Result<T> {
        self.map_err(|e| e.into())
    }
}
