// src/pool/mod.rs
//! Shared recycling pool for default-capacity I/O buffers.

pub(crate) mod config;
pub(crate) mod recycle;
pub(crate) mod stats;

pub use config::{DEFAULT_BUFFER_SIZE, PoolConfig};
pub use recycle::BufferPool;
pub use stats::PoolStats;
