// src/reader/mod.rs
//! Buffered reading over a [`ByteSource`](crate::ByteSource).

mod core;
mod delim;
mod transfer;

pub use self::core::{MIN_READ_BUFFER_SIZE, Reader, ReaderSource};
