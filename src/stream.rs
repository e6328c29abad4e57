// src/stream.rs
//! Byte-stream capabilities wrapped by [`Reader`](crate::Reader) and
//! [`Writer`](crate::Writer).
//!
//! A source hands out bytes and a sink accepts them. Both report progress and
//! failure together as `(count, Option<Error>)`: a source may deliver some
//! bytes *and* announce that nothing more follows in the same call.
//!
//! Either side may also offer a bulk transfer that moves everything at once.
//! The default method returns `None`, meaning the capability is absent.

use crate::error::Error;

/// Something that produces bytes.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes into `buf`.
    ///
    /// Returns the number of bytes written into `buf` together with an error
    /// when the source will not (for now) produce more. Returning a count
    /// larger than `buf.len()` breaks the contract; callers panic on it.
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>);

    /// Moves every remaining byte directly into `sink`, if this source
    /// supports bulk transfer.
    ///
    /// End-of-stream is not an error for a bulk transfer.
    fn write_to(&mut self, sink: &mut dyn ByteSink) -> Option<(u64, Option<Error>)> {
        let _ = sink;
        None
    }
}

/// Something that accepts bytes.
pub trait ByteSink {
    /// Writes bytes from `buf`, returning how many were accepted and any error.
    ///
    /// Accepting fewer than `buf.len()` bytes without an error is a short
    /// write; a count larger than `buf.len()` breaks the contract.
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>);

    /// Pulls every byte from `source` directly, if this sink supports bulk
    /// transfer.
    fn read_from(&mut self, source: &mut dyn ByteSource) -> Option<(u64, Option<Error>)> {
        let _ = source;
        None
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        (**self).read(buf)
    }

    fn write_to(&mut self, sink: &mut dyn ByteSink) -> Option<(u64, Option<Error>)> {
        (**self).write_to(sink)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        (**self).write(buf)
    }

    fn read_from(&mut self, source: &mut dyn ByteSource) -> Option<(u64, Option<Error>)> {
        (**self).read_from(source)
    }
}

/// An in-memory source. Advances past the bytes it hands out and reports
/// [`Error::Eof`] once exhausted.
impl ByteSource for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        if self.is_empty() {
            return if buf.is_empty() { (0, None) } else { (0, Some(Error::Eof)) };
        }
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        (n, None)
    }

    fn write_to(&mut self, sink: &mut dyn ByteSink) -> Option<(u64, Option<Error>)> {
        if self.is_empty() {
            return Some((0, None));
        }
        let remaining: &[u8] = *self;
        let (n, mut err) = sink.write(remaining);
        assert!(n <= remaining.len(), "bufio: sink reported more bytes than offered");
        if n < remaining.len() && err.is_none() {
            err = Some(Error::ShortWrite);
        }
        *self = &remaining[n..];
        Some((n as u64, err))
    }
}

/// An in-memory sink that appends everything it is given.
impl ByteSink for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        self.extend_from_slice(buf);
        (buf.len(), None)
    }

    fn read_from(&mut self, source: &mut dyn ByteSource) -> Option<(u64, Option<Error>)> {
        const CHUNK: usize = 512;
        let mut total = 0u64;
        loop {
            let start = self.len();
            self.resize(start + CHUNK, 0);
            let (n, err) = source.read(&mut self[start..]);
            assert!(n <= CHUNK, "bufio: source reported more bytes than requested");
            self.truncate(start + n);
            total += n as u64;
            match err {
                Some(Error::Eof) => return Some((total, None)),
                Some(err) => return Some((total, Some(err))),
                None if n == 0 => return Some((total, None)),
                None => {}
            }
        }
    }
}

/// Adapts any [`std::io::Read`] into a [`ByteSource`].
///
/// `Ok(0)` for a non-empty buffer becomes [`Error::Eof`]; interrupted reads
/// are retried; other failures pass through as [`Error::Io`].
#[derive(Debug)]
pub struct ReadSource<R>(pub R);

impl<R> ReadSource<R> {
    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: std::io::Read> ByteSource for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        loop {
            match std::io::Read::read(&mut self.0, buf) {
                Ok(0) if !buf.is_empty() => return (0, Some(Error::Eof)),
                Ok(n) => return (n, None),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return (0, Some(e.into())),
            }
        }
    }
}

/// Adapts any [`std::io::Write`] into a [`ByteSink`].
///
/// `std` writers may legitimately accept part of a buffer, so the adapter
/// keeps writing until everything is taken or the writer fails. A writer that
/// accepts zero bytes fails with [`std::io::ErrorKind::WriteZero`].
#[derive(Debug)]
pub struct WriteSink<W>(pub W);

impl<W> WriteSink<W> {
    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: std::io::Write> ByteSink for WriteSink<W> {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        let mut written = 0;
        while written < buf.len() {
            match std::io::Write::write(&mut self.0, &buf[written..]) {
                Ok(0) => {
                    let err = std::io::Error::from(std::io::ErrorKind::WriteZero);
                    return (written, Some(err.into()));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return (written, Some(e.into())),
            }
        }
        (written, None)
    }
}
