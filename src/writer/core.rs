// src/writer/core.rs
//! Writer state, construction, flushing and accessors.
//!
//! The Writer queues bytes in `buf[..n]` with `0 <= n <= size`. Once the sink
//! fails the error is latched for good: nothing is accepted afterwards and
//! every call reports the same error.

use crate::error::{Error, Result};
use crate::pool::BufferPool;
use crate::stream::ByteSink;
use std::sync::Arc;
use tracing::debug;

/// Buffered writer over a [`ByteSink`].
///
/// Call [`flush`](Self::flush) once done; dropping a Writer discards any
/// queued bytes.
///
/// # Examples
///
/// ```
/// use pooled_bufio::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(BufferPool::default());
/// let mut writer = Writer::new(Vec::new(), &pool);
///
/// writer.write_str("héllo");
/// writer.write_byte(b'!')?;
/// assert_eq!(writer.buffered(), 7);
///
/// writer.flush()?;
/// assert_eq!(writer.get_ref(), "héllo!".as_bytes());
/// # Ok::<(), pooled_bufio::Error>(())
/// ```
pub struct Writer<W> {
    pub(crate) inner: W,
    /// `None` until first use and while parked in the pool.
    pub(crate) buf: Option<Box<[u8]>>,
    pub(crate) size: usize,
    pub(crate) n: usize,
    pub(crate) err: Option<Error>,
    pub(crate) pool: Arc<BufferPool>,
}

/// Argument for [`Writer::adapt`]: a raw sink or one that is already buffered.
pub enum WriterSink<W> {
    /// A sink with no buffering of its own.
    Raw(W),
    /// An existing Writer, reused when its buffer is large enough.
    Buffered(Writer<W>),
}

impl<W: ByteSink> Writer<W> {
    /// Creates a Writer with the pool's canonical buffer size.
    pub fn new(inner: W, pool: &Arc<BufferPool>) -> Self {
        Self::with_capacity(inner, 0, pool)
    }

    /// Creates a Writer whose buffer holds `size` bytes; `0` selects the
    /// pool's canonical size. The buffer always holds at least one byte.
    pub fn with_capacity(inner: W, size: usize, pool: &Arc<BufferPool>) -> Self {
        let size = if size == 0 { pool.buffer_size() } else { size }.max(1);
        Self {
            inner,
            buf: None,
            size,
            n: 0,
            err: None,
            pool: Arc::clone(pool),
        }
    }

    /// Returns a Writer with a buffer of at least `size` bytes.
    ///
    /// An already-buffered argument with enough capacity comes back unchanged.
    /// An undersized one is moved into a larger buffer keeping its queued
    /// bytes and latched error.
    pub fn adapt(sink: WriterSink<W>, size: usize, pool: &Arc<BufferPool>) -> Self {
        match sink {
            WriterSink::Raw(inner) => Self::with_capacity(inner, size, pool),
            WriterSink::Buffered(writer) if writer.size >= size => writer,
            WriterSink::Buffered(writer) => writer.regrow(size, pool),
        }
    }

    fn regrow(mut self, size: usize, pool: &Arc<BufferPool>) -> Self {
        let mut grown = Self::with_capacity(self.inner, size, pool);
        if let Some(old) = self.buf.take() {
            if self.n > 0 {
                grown.spare()[..self.n].copy_from_slice(&old[..self.n]);
                grown.n = self.n;
            }
            let _ = self.pool.release(old);
        }
        grown.err = self.err;
        grown
    }

    /// Unused part of the buffer, allocating it on first use.
    pub(crate) fn spare(&mut self) -> &mut [u8] {
        let size = self.size;
        let buf = self.buf.get_or_insert_with(|| self.pool.acquire(size));
        &mut buf[self.n..size]
    }

    /// Gives the buffer back to the pool while nothing is queued.
    fn put_buf(&mut self) {
        if self.n != 0 {
            return;
        }
        match self.buf.take() {
            Some(buf) if buf.len() == self.pool.buffer_size() => {
                if let Err(buf) = self.pool.release(buf) {
                    self.buf = Some(buf);
                }
            }
            other => self.buf = other,
        }
    }

    pub(crate) fn latch(&mut self, err: Error) {
        debug!(error = %err, queued = self.n, "writer error latched");
        self.err = Some(err);
    }

    /// The latched error, if any.
    #[inline]
    pub(crate) fn sticky(&self) -> Result<()> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Sends the queued bytes to the sink, keeping the buffer.
    pub(crate) fn flush_buf(&mut self) -> Result<()> {
        self.sticky()?;
        if self.n == 0 {
            return Ok(());
        }
        let queued = self.n;
        let Some(buf) = self.buf.as_mut() else {
            return Ok(());
        };

        let (n, err) = self.inner.write(&buf[..queued]);
        assert!(
            n <= queued,
            "bufio: sink accepted {} bytes of {} offered",
            n,
            queued
        );
        let err = match err {
            None if n < queued => Some(Error::ShortWrite),
            err => err,
        };

        match err {
            Some(err) => {
                if n > 0 && n < queued {
                    buf.copy_within(n..queued, 0);
                }
                self.n -= n;
                self.latch(err.clone());
                Err(err)
            }
            None => {
                self.n = 0;
                Ok(())
            }
        }
    }

    /// Writes all queued bytes to the sink.
    ///
    /// When the sink takes only part of them, the rest moves to the front of
    /// the buffer and the error is latched; it is not retried. A full flush
    /// lets an idle canonical buffer go back to the pool.
    pub fn flush(&mut self) -> Result<()> {
        let result = self.flush_buf();
        self.put_buf();
        result
    }

    /// Room left in the buffer.
    #[inline]
    pub fn available(&self) -> usize {
        self.size - self.n
    }

    /// Bytes queued and not yet handed to the sink.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.n
    }

    /// Flushes and returns the wrapped sink.
    ///
    /// On failure the Writer comes back alongside the error so its queued
    /// bytes are not lost.
    pub fn into_inner(mut self) -> std::result::Result<W, (Error, Self)> {
        if let Err(err) = self.flush() {
            return Err((err, self));
        }
        if let Some(buf) = self.buf.take() {
            let _ = self.pool.release(buf);
        }
        Ok(self.inner)
    }
}

impl<W> Writer<W> {
    /// Configured buffer size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Shared reference to the wrapped sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutable reference to the wrapped sink.
    ///
    /// Writing to it directly bypasses any bytes still queued here.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

impl<W> std::fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("size", &self.size)
            .field("buffered", &self.n)
            .field("err", &self.err)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolConfig;

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::default())
    }

    /// Accepts a fixed number of bytes per call, without complaint.
    #[derive(Debug)]
    struct Stingy {
        out: Vec<u8>,
        per_call: usize,
    }

    impl ByteSink for Stingy {
        fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
            let n = buf.len().min(self.per_call);
            self.out.extend_from_slice(&buf[..n]);
            (n, None)
        }
    }

    /// Fails every write and counts the attempts.
    struct Refusing {
        err: Error,
        calls: usize,
    }

    impl ByteSink for Refusing {
        fn write(&mut self, _buf: &[u8]) -> (usize, Option<Error>) {
            self.calls += 1;
            (0, Some(self.err.clone()))
        }
    }

    #[test]
    fn test_zero_size_means_default() {
        let writer = Writer::with_capacity(Vec::new(), 0, &pool());
        assert_eq!(writer.capacity(), 4096);
        assert_eq!(writer.available(), 4096);
    }

    #[test]
    fn test_zero_size_pool_still_gives_usable_writer() {
        let pool = Arc::new(BufferPool::new(PoolConfig::with_buffer_size(0)));
        let mut writer = Writer::new(Vec::new(), &pool);
        assert_eq!(writer.capacity(), 1);
        writer.write_byte(b'a').unwrap();
        writer.write_byte(b'b').unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), b"ab");
    }

    #[test]
    fn test_flush_sends_queued_bytes() {
        let mut writer = Writer::new(Vec::new(), &pool());
        writer.write(b"queued");
        assert!(writer.get_ref().is_empty());
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), b"queued");
        assert_eq!(writer.buffered(), 0);
    }

    #[test]
    fn test_partial_flush_keeps_remainder_and_latches() {
        let sink = Stingy { out: Vec::new(), per_call: 2 };
        let mut writer = Writer::with_capacity(sink, 16, &pool());
        writer.write(b"abcdef");

        assert_eq!(writer.flush(), Err(Error::ShortWrite));
        assert_eq!(writer.get_ref().out, b"ab");
        assert_eq!(writer.buffered(), 4);
        assert_eq!(&writer.buf.as_ref().unwrap()[..4], b"cdef");

        // Not retried: the error is permanent.
        assert_eq!(writer.flush(), Err(Error::ShortWrite));
        assert_eq!(writer.get_ref().out, b"ab");
    }

    #[test]
    fn test_sink_error_is_permanent() {
        let err = Error::other("disk gone");
        let sink = Refusing { err: err.clone(), calls: 0 };
        let mut writer = Writer::with_capacity(sink, 8, &pool());
        writer.write(b"abc");

        assert_eq!(writer.flush(), Err(err.clone()));
        assert_eq!(writer.get_ref().calls, 1);
        assert_eq!(writer.write(b"more"), (0, Some(err.clone())));
        assert_eq!(writer.flush(), Err(err.clone()));
        assert_eq!(writer.write_byte(b'x'), Err(err));
        assert_eq!(writer.get_ref().calls, 1);
    }

    #[test]
    fn test_flush_returns_buffer_to_pool() {
        let pool = Arc::new(BufferPool::new(PoolConfig::with_buffer_size(64)));
        let mut writer = Writer::with_capacity(Vec::new(), 32, &pool);
        writer.write(b"hi");
        assert_eq!(pool.available(), 0);
        writer.flush().unwrap();
        assert_eq!(pool.available(), 1);
        assert!(writer.buf.is_none());

        // The next write takes it back out.
        writer.write(b"again");
        assert_eq!(pool.available(), 0);
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), b"hiagain");
    }

    #[test]
    fn test_oversized_buffer_is_not_pooled() {
        let pool = Arc::new(BufferPool::new(PoolConfig::with_buffer_size(64)));
        let mut writer = Writer::with_capacity(Vec::new(), 128, &pool);
        writer.write(b"big");
        writer.flush().unwrap();
        assert_eq!(pool.available(), 0);
        assert!(writer.buf.is_some());
    }

    #[test]
    fn test_adapt_reuses_large_enough_writer() {
        let pool = pool();
        let mut writer = Writer::with_capacity(Vec::new(), 64, &pool);
        writer.write(b"kept");
        let same = Writer::adapt(WriterSink::Buffered(writer), 32, &pool);
        assert_eq!(same.capacity(), 64);
        assert_eq!(same.buffered(), 4);
    }

    #[test]
    fn test_adapt_regrows_small_writer() {
        let pool = pool();
        let mut writer = Writer::with_capacity(Vec::new(), 8, &pool);
        writer.write(b"abc");
        let mut grown = Writer::adapt(WriterSink::Buffered(writer), 32, &pool);
        assert_eq!(grown.capacity(), 32);
        assert_eq!(grown.buffered(), 3);
        grown.write(b"defghijkl");
        grown.flush().unwrap();
        assert_eq!(grown.get_ref(), b"abcdefghijkl");
    }

    #[test]
    fn test_adapt_keeps_latched_error() {
        let pool = pool();
        let sink = Refusing { err: Error::other("nope"), calls: 0 };
        let mut writer = Writer::with_capacity(sink, 4, &pool);
        writer.write(b"abcdef");
        assert!(writer.flush().is_err());
        let mut grown = Writer::adapt(WriterSink::Buffered(writer), 64, &pool);
        assert!(grown.write(b"x").1.is_some());
    }

    #[test]
    fn test_into_inner_flushes() {
        let mut writer = Writer::new(Vec::new(), &pool());
        writer.write(b"tail");
        assert_eq!(writer.into_inner().unwrap(), b"tail");
    }

    #[test]
    fn test_into_inner_hands_back_writer_on_error() {
        let sink = Stingy { out: Vec::new(), per_call: 1 };
        let mut writer = Writer::with_capacity(sink, 16, &pool());
        writer.write(b"xyz");
        let (err, writer) = writer.into_inner().unwrap_err();
        assert_eq!(err, Error::ShortWrite);
        assert_eq!(writer.buffered(), 2);
    }
}
