// src/pool/config.rs
//! Configuration for buffer pools

/// Buffer size used when a Reader or Writer is built without an explicit one.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Number of idle buffers a pool keeps by default.
pub const DEFAULT_MAX_IDLE: usize = 8;

/// Configuration for buffer pool behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Canonical buffer size (bytes). Only buffers of exactly this size are pooled.
    pub buffer_size: usize,
    /// Maximum number of idle buffers kept in the pool
    pub max_pool_size: usize,
    /// Number of buffers to pre-allocate at startup
    pub min_pool_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_pool_size: DEFAULT_MAX_IDLE,
            min_pool_size: 0,
        }
    }
}

impl PoolConfig {
    /// Default configuration with a different canonical buffer size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }
}
