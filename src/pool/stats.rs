// src/pool/stats.rs
//! Statistics tracking for buffer pools.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of a [`BufferPool`](crate::BufferPool)'s counters.
///
/// Counters are read with `Relaxed` ordering and are eventually consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of buffers currently idle in the pool
    pub available: usize,
    /// Total number of acquire() calls
    pub acquired: usize,
    /// Acquisitions served from an idle pooled buffer
    pub reused: usize,
    /// Acquisitions that had to allocate fresh storage
    pub allocated: usize,
    /// Buffers accepted back into the pool
    pub released: usize,
    /// Buffers offered back but rejected (wrong size or pool full)
    pub discarded: usize,
}

impl PoolStats {
    /// Returns the pool hit rate as a percentage (0.0-100.0).
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_bufio::prelude::*;
    ///
    /// let pool = BufferPool::default();
    /// let buf = pool.acquire(4096);
    /// pool.release(buf).unwrap();
    /// let _again = pool.acquire(4096);
    ///
    /// assert_eq!(pool.stats().hit_rate(), 50.0);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        if self.acquired == 0 {
            return 0.0;
        }
        (self.reused as f64 / self.acquired as f64) * 100.0
    }
}

pub(crate) struct PoolCounters {
    pub(crate) acquired: AtomicUsize,
    pub(crate) reused: AtomicUsize,
    pub(crate) allocated: AtomicUsize,
    pub(crate) released: AtomicUsize,
    pub(crate) discarded: AtomicUsize,
}

impl PoolCounters {
    pub(crate) fn new() -> Self {
        Self {
            acquired: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, available: usize) -> PoolStats {
        PoolStats {
            available,
            acquired: self.acquired.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
