// src/pool/recycle.rs
//! Lock-free bounded cache of idle default-size buffers.
//!
//! # Sizing
//!
//! Only buffers whose length equals the pool's canonical `buffer_size` are
//! ever pooled. A request for a smaller capacity still receives canonical
//! storage (the caller views a prefix of it) so that the buffer can come back
//! later. Requests above the canonical size get an exact, private allocation
//! that the pool refuses on release.
//!
//! # Memory Safety
//!
//! Buffers are securely zeroed (via `zeroize`) before they enter the pool, so
//! a Reader or Writer never observes bytes left behind by another stream.
//!
//! # Concurrency
//!
//! Idle buffers sit in a `crossbeam::queue::ArrayQueue`. Neither `acquire`
//! nor `release` blocks: an empty pool means a fresh allocation, a full pool
//! means the buffer is handed back to the caller. Both outcomes only forgo
//! reuse and are never errors.

use super::config::PoolConfig;
use super::stats::{PoolCounters, PoolStats};
use crossbeam::queue::ArrayQueue;
use tracing::trace;
use zeroize::Zeroize;

/// Shared, thread-safe recycling pool for I/O buffers.
///
/// A pool is an explicit dependency: every [`Reader`](crate::Reader) and
/// [`Writer`](crate::Writer) is built with an `Arc<BufferPool>`, so tests can
/// give each case its own isolated pool.
///
/// # Example
///
/// ```rust
/// use pooled_bufio::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(BufferPool::default());
/// let mut reader = Reader::new(&b"hello\n"[..], &pool);
///
/// let (line, err) = reader.read_string(b'\n');
/// assert_eq!(line, "hello\n");
/// assert!(err.is_none());
/// ```
pub struct BufferPool {
    /// `None` when pooling is disabled (`max_pool_size == 0`).
    idle: Option<ArrayQueue<Box<[u8]>>>,
    config: PoolConfig,
    counters: PoolCounters,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BufferPool {
    /// Creates a new pool and pre-warms it with `config.min_pool_size` buffers
    /// (capped at `max_pool_size`).
    pub fn new(config: PoolConfig) -> Self {
        let idle = (config.max_pool_size > 0).then(|| ArrayQueue::new(config.max_pool_size));
        if let Some(queue) = &idle {
            for _ in 0..config.min_pool_size.min(config.max_pool_size) {
                let _ = queue.push(vec![0u8; config.buffer_size].into_boxed_slice());
            }
        }
        Self {
            idle,
            config,
            counters: PoolCounters::new(),
        }
    }

    /// The canonical buffer size; the only size this pool recycles.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.config.buffer_size
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns storage able to hold at least `capacity` bytes.
    ///
    /// When `capacity <= buffer_size` the result has exactly `buffer_size`
    /// bytes, reused from the pool when one is idle. Larger requests always
    /// allocate exactly `capacity` bytes.
    pub fn acquire(&self, capacity: usize) -> Box<[u8]> {
        PoolCounters::bump(&self.counters.acquired);

        if capacity <= self.config.buffer_size {
            if let Some(buf) = self.idle.as_ref().and_then(ArrayQueue::pop) {
                PoolCounters::bump(&self.counters.reused);
                return buf;
            }
            trace!(buffer_size = self.config.buffer_size, "buffer pool miss");
            PoolCounters::bump(&self.counters.allocated);
            return vec![0u8; self.config.buffer_size].into_boxed_slice();
        }

        PoolCounters::bump(&self.counters.allocated);
        vec![0u8; capacity].into_boxed_slice()
    }

    /// Offers a buffer back to the pool.
    ///
    /// The buffer is accepted only when its length is the canonical size and
    /// the pool has a free slot; accepted buffers are zeroed first. A rejected
    /// buffer is returned unchanged in `Err` so the caller can keep using it
    /// or simply drop it.
    pub fn release(&self, mut buf: Box<[u8]>) -> Result<(), Box<[u8]>> {
        let queue = match &self.idle {
            Some(queue) if buf.len() == self.config.buffer_size && !queue.is_full() => queue,
            _ => {
                trace!(len = buf.len(), "buffer not pooled");
                PoolCounters::bump(&self.counters.discarded);
                return Err(buf);
            }
        };

        buf[..].zeroize();
        match queue.push(buf) {
            Ok(()) => {
                PoolCounters::bump(&self.counters.released);
                Ok(())
            }
            // Lost a race for the last slot.
            Err(buf) => {
                PoolCounters::bump(&self.counters.discarded);
                Err(buf)
            }
        }
    }

    /// Number of buffers currently idle in the pool.
    #[inline]
    pub fn available(&self) -> usize {
        self.idle.as_ref().map_or(0, ArrayQueue::len)
    }

    /// Returns a snapshot of pool statistics.
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.available())
    }

    /// Drops every idle buffer.
    pub fn clear(&self) {
        if let Some(queue) = &self.idle {
            while queue.pop().is_some() {}
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("config", &self.config)
            .field("available", &self.available())
            .finish()
    }
}
