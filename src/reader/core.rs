// src/reader/core.rs
//! Reader state, construction and the byte/rune level operations.
//!
//! The Reader owns one buffer and two cursors into it: `r` is the next unread
//! byte and `w` is the fill limit. The invariant `0 <= r <= w <= size` holds
//! between calls. The buffer itself is borrowed from the pool lazily and
//! handed back once the stream has ended and every byte was consumed.

use crate::error::{Error, Result};
use crate::pool::BufferPool;
use crate::stream::ByteSource;
use crate::utf8;
use std::sync::Arc;

/// Smallest buffer a Reader will use.
pub const MIN_READ_BUFFER_SIZE: usize = 16;

/// Consecutive empty, error-free reads tolerated before giving up.
const MAX_CONSECUTIVE_EMPTY_READS: usize = 100;

/// Buffered reader over a [`ByteSource`].
///
/// Errors from the source are *sticky*: the first one is latched and surfaced
/// exactly once, by the first call that runs out of buffered bytes. After that
/// the Reader behaves as if no error occurred, which lets a caller observe a
/// clean "no data, no error" state once a source is drained.
///
/// Not safe for concurrent use; share it behind a lock if needed.
///
/// # Examples
///
/// ```
/// use pooled_bufio::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(BufferPool::default());
/// let mut reader = Reader::new(&b"x=1\n"[..], &pool);
///
/// assert_eq!(reader.peek(2).0, b"x=");
/// assert_eq!(reader.read_byte()?, b'x');
/// reader.unread_byte()?;
/// assert_eq!(reader.read_string(b'\n').0, "x=1\n");
/// # Ok::<(), pooled_bufio::Error>(())
/// ```
pub struct Reader<R> {
    pub(crate) inner: R,
    /// `None` until first use and after the buffer went back to the pool.
    pub(crate) buf: Option<Box<[u8]>>,
    pub(crate) size: usize,
    pub(crate) r: usize,
    pub(crate) w: usize,
    pub(crate) err: Option<Error>,
    pub(crate) last_byte: Option<u8>,
    pub(crate) last_rune_size: Option<usize>,
    pub(crate) pool: Arc<BufferPool>,
}

/// Argument for [`Reader::adapt`]: a raw source or one that is already
/// buffered.
pub enum ReaderSource<R> {
    /// A source with no buffering of its own.
    Raw(R),
    /// An existing Reader, reused when its buffer is large enough.
    Buffered(Reader<R>),
}

impl<R: ByteSource> Reader<R> {
    /// Creates a Reader with the pool's canonical buffer size.
    pub fn new(inner: R, pool: &Arc<BufferPool>) -> Self {
        Self::with_capacity(inner, pool.buffer_size(), pool)
    }

    /// Creates a Reader whose buffer holds at least `size` bytes.
    ///
    /// Sizes below [`MIN_READ_BUFFER_SIZE`] are raised to it. Buffers at or
    /// below the pool's canonical size are recycled through the pool.
    pub fn with_capacity(inner: R, size: usize, pool: &Arc<BufferPool>) -> Self {
        Self {
            inner,
            buf: None,
            size: size.max(MIN_READ_BUFFER_SIZE),
            r: 0,
            w: 0,
            err: None,
            last_byte: None,
            last_rune_size: None,
            pool: Arc::clone(pool),
        }
    }

    /// Returns a Reader with a buffer of at least `size` bytes.
    ///
    /// An already-buffered argument with enough capacity comes back unchanged.
    /// An undersized one is moved into a larger buffer; its pending bytes,
    /// latched error and unread state carry over, so callers observe the same
    /// byte stream either way.
    pub fn adapt(source: ReaderSource<R>, size: usize, pool: &Arc<BufferPool>) -> Self {
        match source {
            ReaderSource::Raw(inner) => Self::with_capacity(inner, size, pool),
            ReaderSource::Buffered(reader) if reader.size >= size => reader,
            ReaderSource::Buffered(reader) => reader.regrow(size, pool),
        }
    }

    fn regrow(mut self, size: usize, pool: &Arc<BufferPool>) -> Self {
        let mut grown = Self::with_capacity(self.inner, size, pool);
        if let Some(old) = self.buf.take() {
            let pending = self.w - self.r;
            if pending > 0 {
                grown.alloc_buf();
                if let Some(buf) = grown.buf.as_mut() {
                    buf[..pending].copy_from_slice(&old[self.r..self.w]);
                }
                grown.w = pending;
            }
            let _ = self.pool.release(old);
        }
        grown.err = self.err;
        grown.last_byte = self.last_byte;
        grown.last_rune_size = self.last_rune_size;
        grown
    }

    /// Makes `self.buf` present.
    pub(crate) fn alloc_buf(&mut self) {
        if self.buf.is_none() {
            self.buf = Some(self.pool.acquire(self.size));
        }
    }

    /// Hands the buffer back to the pool once the stream ended and nothing is
    /// left unread. Must run before the latched end-of-stream is taken.
    pub(crate) fn put_buf(&mut self) {
        if self.r != self.w || !matches!(self.err, Some(Error::Eof)) {
            return;
        }
        match self.buf.take() {
            Some(buf) if buf.len() == self.pool.buffer_size() => match self.pool.release(buf) {
                Ok(()) => {
                    self.r = 0;
                    self.w = 0;
                }
                Err(buf) => self.buf = Some(buf),
            },
            // Private allocation; stays with this Reader.
            other => self.buf = other,
        }
    }

    /// Reads a new chunk into the buffer.
    ///
    /// Unread bytes slide to the front first. Retries a bounded number of
    /// empty, error-free reads before latching [`Error::NoProgress`].
    ///
    /// # Panics
    ///
    /// Panics if the source reports more bytes than it was offered.
    pub(crate) fn fill(&mut self) {
        self.alloc_buf();
        let size = self.size;
        let Some(buf) = self.buf.as_mut() else {
            return;
        };

        if self.r > 0 {
            buf.copy_within(self.r..self.w, 0);
            self.w -= self.r;
            self.r = 0;
        }

        for _ in 0..MAX_CONSECUTIVE_EMPTY_READS {
            let space = &mut buf[self.w..size];
            let offered = space.len();
            let (n, err) = self.inner.read(space);
            assert!(
                n <= offered,
                "bufio: source returned {} bytes for a {} byte buffer",
                n,
                offered
            );
            self.w += n;
            if let Some(err) = err {
                self.err = Some(err);
                return;
            }
            if n > 0 || offered == 0 {
                return;
            }
        }
        self.err = Some(Error::NoProgress);
    }

    /// Refills an empty buffer with exactly one source call.
    fn read_once(&mut self) {
        self.alloc_buf();
        let size = self.size;
        let Some(buf) = self.buf.as_mut() else {
            return;
        };
        self.r = 0;
        self.w = 0;
        let (n, err) = self.inner.read(&mut buf[..size]);
        assert!(
            n <= size,
            "bufio: source returned {} bytes for a {} byte buffer",
            n,
            size
        );
        self.w = n;
        if err.is_some() {
            self.err = err;
        }
    }

    /// Takes the latched error, clearing it.
    #[inline]
    pub(crate) fn read_err(&mut self) -> Option<Error> {
        self.err.take()
    }

    /// Bytes `[r, w)`, or nothing while no buffer is held.
    #[inline]
    pub(crate) fn unread(&self) -> &[u8] {
        match &self.buf {
            Some(buf) => &buf[self.r..self.w],
            None => &[],
        }
    }

    #[inline]
    pub(crate) fn slice(&self, range: std::ops::Range<usize>) -> &[u8] {
        match &self.buf {
            Some(buf) => &buf[range],
            None => &[],
        }
    }

    /// Returns the next `n` bytes without consuming them.
    ///
    /// The slice is valid until the next call that mutates the Reader. When
    /// fewer than `n` bytes come back the error says why: the source's latched
    /// error, or [`Error::BufferFull`] when `n` exceeds the buffer size.
    pub fn peek(&mut self, n: usize) -> (&[u8], Option<Error>) {
        self.last_rune_size = None;
        if n > self.size {
            return (&[], Some(Error::BufferFull));
        }
        while self.w - self.r < n && self.err.is_none() {
            self.fill();
        }

        let m = (self.w - self.r).min(n);
        let err = if m < n {
            Some(self.read_err().unwrap_or(Error::BufferFull))
        } else {
            None
        };
        (self.slice(self.r..self.r + m), err)
    }

    /// Reads up to `dst.len()` bytes.
    ///
    /// Calls the source at most once, and only when nothing is buffered. When
    /// `dst` is at least as large as the buffer, reads straight into `dst`.
    /// An empty, error-free source read comes back as `(0, None)`. Returns
    /// `(0, Some(err))` once the buffer is empty and an error is latched.
    pub fn read(&mut self, dst: &mut [u8]) -> (usize, Option<Error>) {
        if dst.is_empty() {
            return (0, self.read_err());
        }
        if self.r == self.w {
            if self.err.is_none() {
                if dst.len() >= self.size {
                    // Large read, empty buffer: skip the copy.
                    let (n, err) = self.inner.read(dst);
                    assert!(
                        n <= dst.len(),
                        "bufio: source returned {} bytes for a {} byte buffer",
                        n,
                        dst.len()
                    );
                    if n > 0 {
                        self.last_byte = Some(dst[n - 1]);
                        self.last_rune_size = None;
                    }
                    self.err = err;
                    return (n, self.read_err());
                }
                self.read_once();
            }
            if self.r == self.w {
                self.put_buf();
                return (0, self.read_err());
            }
        }

        let n = dst.len().min(self.w - self.r);
        dst[..n].copy_from_slice(&self.unread()[..n]);
        self.r += n;
        self.last_byte = Some(dst[n - 1]);
        self.last_rune_size = None;
        self.put_buf();
        (n, None)
    }

    /// Reads a single byte, filling as often as needed.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.last_rune_size = None;
        while self.r == self.w {
            self.put_buf();
            if let Some(err) = self.read_err() {
                return Err(err);
            }
            self.fill();
        }
        let c = self.unread()[0];
        self.r += 1;
        self.last_byte = Some(c);
        self.put_buf();
        Ok(c)
    }

    /// Pushes back the most recently read byte.
    ///
    /// Works right after any read that delivered bytes, including a direct
    /// large [`read`](Self::read) that bypassed the buffer. Fails with
    /// [`Error::InvalidUnreadByte`] when called twice in a row or before any
    /// read.
    pub fn unread_byte(&mut self) -> Result<()> {
        self.last_rune_size = None;
        let Some(c) = self.last_byte.take() else {
            return Err(Error::InvalidUnreadByte);
        };
        if self.r == self.w {
            // Nothing buffered (or the byte bypassed the buffer): rebuild it.
            self.alloc_buf();
            if let Some(buf) = self.buf.as_mut() {
                buf[0] = c;
            }
            self.r = 0;
            self.w = 1;
            return Ok(());
        }
        if self.r == 0 {
            return Err(Error::InvalidUnreadByte);
        }
        self.r -= 1;
        Ok(())
    }

    /// Reads one UTF-8 encoded scalar value and its width in bytes.
    ///
    /// An invalid encoding consumes one byte and yields
    /// [`char::REPLACEMENT_CHARACTER`] with width 1.
    pub fn read_rune(&mut self) -> Result<(char, usize)> {
        while self.r + utf8::UTF_MAX > self.w
            && !utf8::full_rune(self.unread())
            && self.err.is_none()
        {
            self.fill();
        }
        self.last_rune_size = None;
        if self.r == self.w {
            self.put_buf();
            return Err(self.read_err().unwrap_or(Error::Eof));
        }

        let pending = self.unread();
        let (c, size) = if pending[0] < utf8::RUNE_SELF {
            (char::from(pending[0]), 1)
        } else {
            utf8::decode_rune(pending)
        };
        self.r += size;
        self.last_byte = Some(self.unread_tail_byte());
        self.last_rune_size = Some(size);
        Ok((c, size))
    }

    fn unread_tail_byte(&self) -> u8 {
        self.slice(self.r - 1..self.r)[0]
    }

    /// Pushes back the rune returned by the immediately preceding
    /// [`read_rune`](Self::read_rune).
    ///
    /// Any other operation in between, including byte-level reads, makes this
    /// fail with [`Error::InvalidUnreadRune`].
    pub fn unread_rune(&mut self) -> Result<()> {
        match self.last_rune_size {
            Some(size) if size <= self.r => {
                self.r -= size;
                self.last_byte = None;
                self.last_rune_size = None;
                Ok(())
            }
            _ => Err(Error::InvalidUnreadRune),
        }
    }

    /// Number of bytes that can be read without touching the source.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.w - self.r
    }
}

impl<R> Reader<R> {
    /// Configured buffer size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Shared reference to the wrapped source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable reference to the wrapped source.
    ///
    /// Reading from it directly skips any bytes still buffered here.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the wrapped source, discarding buffered bytes.
    ///
    /// The buffer goes back to the pool when it has the canonical size.
    pub fn into_inner(mut self) -> R {
        if let Some(buf) = self.buf.take() {
            let _ = self.pool.release(buf);
        }
        self.inner
    }
}

impl<R> std::fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("size", &self.size)
            .field("buffered", &(self.w - self.r))
            .field("err", &self.err)
            .finish_non_exhaustive()
    }
}
