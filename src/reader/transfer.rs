// src/reader/transfer.rs
//! Draining a Reader into a sink, and std / capability trait impls.

use super::core::Reader;
use crate::error::Error;
use crate::stream::{ByteSink, ByteSource};

impl<R: ByteSource> Reader<R> {
    /// Writes the buffered bytes to `sink`.
    fn write_buf(&mut self, sink: &mut dyn ByteSink) -> (u64, Option<Error>) {
        if self.r == self.w {
            return (0, None);
        }
        let pending = self.w - self.r;
        let (n, err) = sink.write(self.unread());
        assert!(
            n <= pending,
            "bufio: sink accepted {} bytes of {} offered",
            n,
            pending
        );
        self.r += n;
        let err = match err {
            None if n < pending => Some(Error::ShortWrite),
            err => err,
        };
        self.put_buf();
        (n as u64, err)
    }

    /// Copies everything left in the stream to `sink`.
    ///
    /// Buffered bytes go out first. After that, a source with its own bulk
    /// transfer takes over; otherwise the Reader refills and drains until the
    /// source is exhausted. Reaching end-of-stream is not an error.
    pub fn write_to(&mut self, sink: &mut dyn ByteSink) -> (u64, Option<Error>) {
        self.last_byte = None;
        self.last_rune_size = None;

        let (mut total, err) = self.write_buf(sink);
        if err.is_some() {
            return (total, err);
        }

        if let Some((m, err)) = self.inner.write_to(sink) {
            return (total + m, err);
        }

        self.fill();
        while self.r < self.w {
            let (m, err) = self.write_buf(sink);
            total += m;
            if err.is_some() {
                return (total, err);
            }
            self.fill();
        }

        if matches!(self.err, Some(Error::Eof)) {
            self.put_buf();
            self.err = None;
        }
        (total, self.read_err())
    }
}

impl<R: ByteSource> ByteSource for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        Reader::read(self, buf)
    }

    fn write_to(&mut self, sink: &mut dyn ByteSink) -> Option<(u64, Option<Error>)> {
        Some(Reader::write_to(self, sink))
    }
}

impl<R: ByteSource> std::io::Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match Reader::read(self, buf) {
            (n, err) if n > 0 => {
                // Keep the error for the next call.
                if err.is_some() {
                    self.err = err;
                }
                Ok(n)
            }
            (_, None) | (_, Some(Error::Eof)) => Ok(0),
            (_, Some(err)) => Err(err.into()),
        }
    }
}

impl<R: ByteSource> std::io::BufRead for Reader<R> {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        if self.r == self.w {
            if self.err.is_none() {
                self.fill();
            }
            if self.r == self.w {
                self.put_buf();
                return match self.read_err() {
                    None | Some(Error::Eof) => Ok(&[]),
                    Some(err) => Err(err.into()),
                };
            }
        }
        Ok(self.unread())
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.w - self.r);
        if amt > 0 {
            self.r += amt;
            self.last_byte = Some(self.slice(self.r - 1..self.r)[0]);
            self.last_rune_size = None;
            self.put_buf();
        }
    }
}
