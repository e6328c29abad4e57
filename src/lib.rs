// src/lib.rs
//! # Pooled Buffered I/O
//!
//! Buffered [`Reader`] and [`Writer`] wrappers over raw byte streams, backed by
//! a shared recycling [`BufferPool`].
//!
//! Features:
//! - Peek, byte/rune reads with one-step unread, and delimiter scanning
//! - Sticky errors: a Reader surfaces a source error once, a Writer keeps a
//!   sink error for good
//! - Large reads and writes bypass the buffer when it is empty
//! - Bulk transfers delegate to the other side when it supports them
//! - Lock-free buffer recycling with secure zeroing (`zeroize`) on release
//! - `std::io::{Read, BufRead, Write}` interop
//!
//! ```
//! use pooled_bufio::prelude::*;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(BufferPool::default());
//!
//! let mut writer = Writer::new(Vec::new(), &pool);
//! writer.write_str("GET /index.html\r\nHost: example.com\r\n");
//! writer.flush()?;
//! let wire = writer.into_inner().map_err(|(err, _)| err)?;
//!
//! let mut reader = Reader::new(&wire[..], &pool);
//! let (request_line, _) = reader.read_line()?;
//! assert_eq!(request_line, b"GET /index.html");
//! # Ok::<(), pooled_bufio::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pool;
pub mod read_writer;
pub mod reader;
pub mod stream;
pub mod writer;

mod utf8;

// Re-export main types
pub use error::{Error, Result, ResultExt};
pub use pool::{BufferPool, DEFAULT_BUFFER_SIZE, PoolConfig, PoolStats};
pub use read_writer::ReadWriter;
pub use reader::{MIN_READ_BUFFER_SIZE, Reader, ReaderSource};
pub use stream::{ByteSink, ByteSource, ReadSource, WriteSink};
pub use writer::{Writer, WriterSink};

/// Commonly used imports.
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::pool::{BufferPool, PoolConfig, PoolStats};
    pub use crate::read_writer::ReadWriter;
    pub use crate::reader::{Reader, ReaderSource};
    pub use crate::stream::{ByteSink, ByteSource, ReadSource, WriteSink};
    pub use crate::writer::{Writer, WriterSink};
}
