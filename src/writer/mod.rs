// src/writer/mod.rs
//! Buffered writing over a [`ByteSink`](crate::ByteSink).

mod core;
mod ops;

pub use self::core::{Writer, WriterSink};
