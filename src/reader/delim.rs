// src/reader/delim.rs
//! Delimiter-bounded reads.

use super::core::Reader;
use crate::error::{Error, Result};
use crate::stream::ByteSource;
use std::ops::Range;

impl<R: ByteSource> Reader<R> {
    /// Scans for `delim`, returning the buffer range of the record and the
    /// error that ended the scan early, if any.
    fn scan_until(&mut self, delim: u8) -> (Range<usize>, Option<Error>) {
        if let Some(i) = memchr::memchr(delim, self.unread()) {
            let start = self.r;
            self.r += i + 1;
            return (start..self.r, None);
        }

        loop {
            if self.err.is_some() {
                let range = self.r..self.w;
                self.r = self.w;
                if range.is_empty() {
                    self.put_buf();
                }
                return (range, self.read_err());
            }

            // fill() slides unread bytes to the front, so afterwards the
            // record starts at 0 and only `[n, w)` is new.
            let n = self.buffered();
            self.fill();

            if let Some(i) = memchr::memchr(delim, self.slice(n..self.w)) {
                self.r = n + i + 1;
                return (0..self.r, None);
            }

            if self.buffered() >= self.size {
                self.r = self.w;
                return (0..self.w, Some(Error::BufferFull));
            }
        }
    }

    fn note_delivered(&mut self, range: &Range<usize>) {
        self.last_rune_size = None;
        self.last_byte = (!range.is_empty()).then(|| self.slice(range.end - 1..range.end)[0]);
    }

    /// Reads until the first `delim`, returning a view into the buffer.
    ///
    /// The view is valid until the next call that mutates the Reader. The
    /// error is `Some` if and only if the bytes do not end with `delim`:
    /// [`Error::BufferFull`] when the buffer filled up first (all buffered
    /// bytes are returned), otherwise the source's error.
    ///
    /// Prefer [`read_bytes`](Self::read_bytes) or
    /// [`read_string`](Self::read_string) unless the copy matters.
    pub fn read_slice(&mut self, delim: u8) -> (&[u8], Option<Error>) {
        let (range, err) = self.scan_until(delim);
        self.note_delivered(&range);
        (self.slice(range), err)
    }

    /// Reads one line without its `\n` or `\r\n` terminator.
    ///
    /// Returns `(line, is_prefix)`. When a line does not fit in the buffer the
    /// first part comes back with `is_prefix = true` and later calls return
    /// the rest. A `\r` stranded at the end of such a fragment is held back so
    /// the next call can still recognise a `\r\n` split across fragments.
    ///
    /// Input that ends without a final line terminator yields that last line
    /// with no error and no other indication. An error is returned only when
    /// no bytes at all are available.
    pub fn read_line(&mut self) -> Result<(&[u8], bool)> {
        let (mut range, err) = self.scan_until(b'\n');

        if let Some(Error::BufferFull) = err {
            if !range.is_empty() && self.slice(range.end - 1..range.end)[0] == b'\r' {
                debug_assert!(self.r > 0, "bufio: tried to rewind past start of buffer");
                self.r -= 1;
                range.end -= 1;
            }
            self.note_delivered(&range);
            return Ok((self.slice(range), true));
        }

        if range.is_empty() {
            self.last_rune_size = None;
            return match err {
                Some(err) => Err(err),
                None => Ok((&[], false)),
            };
        }
        self.note_delivered(&range);

        let line = self.slice(range.clone());
        let mut end = range.end;
        if line.ends_with(b"\r\n") {
            end -= 2;
        } else if line.ends_with(b"\n") {
            end -= 1;
        }
        Ok((self.slice(range.start..end), false))
    }

    /// Reads until the first `delim`, returning an owned copy that includes
    /// the delimiter.
    ///
    /// Unlike [`read_slice`](Self::read_slice) this accumulates across full
    /// buffers, so records of any length come back whole. The error is `Some`
    /// if and only if the data does not end with `delim`.
    pub fn read_bytes(&mut self, delim: u8) -> (Vec<u8>, Option<Error>) {
        let mut full: Vec<Vec<u8>> = Vec::new();
        let (frag, err) = loop {
            let (range, err) = self.scan_until(delim);
            self.note_delivered(&range);
            match err {
                Some(Error::BufferFull) => full.push(self.slice(range).to_vec()),
                err => break (range, err),
            }
        };

        let total = full.iter().map(Vec::len).sum::<usize>() + frag.len();
        let mut out = Vec::with_capacity(total);
        for piece in &full {
            out.extend_from_slice(piece);
        }
        out.extend_from_slice(self.slice(frag));
        (out, err)
    }

    /// Like [`read_bytes`](Self::read_bytes), returning text.
    ///
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`.
    pub fn read_string(&mut self, delim: u8) -> (String, Option<Error>) {
        let (bytes, err) = self.read_bytes(delim);
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        self.put_buf();
        (line, err)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::pool::BufferPool;
    use crate::reader::Reader;
    use crate::stream::ByteSource;
    use std::sync::Arc;

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::default())
    }

    /// Yields pre-cut chunks, then end-of-stream.
    struct Chunks(Vec<&'static [u8]>);

    impl ByteSource for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
            if self.0.is_empty() {
                return (0, Some(Error::Eof));
            }
            let chunk = self.0.remove(0);
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.0.insert(0, &chunk[n..]);
            }
            (n, None)
        }
    }

    #[test]
    fn test_read_slice_found_in_buffer() {
        let mut reader = Reader::new(&b"ab,cd,"[..], &pool());
        assert_eq!(reader.read_slice(b','), (&b"ab,"[..], None));
        assert_eq!(reader.read_slice(b','), (&b"cd,"[..], None));
        assert_eq!(reader.read_slice(b','), (&b""[..], Some(Error::Eof)));
    }

    #[test]
    fn test_read_slice_across_fills() {
        let src = Chunks(vec![b"ab", b"cd", b"e\nf"]);
        let mut reader = Reader::with_capacity(src, 16, &pool());
        assert_eq!(reader.read_slice(b'\n'), (&b"abcde\n"[..], None));
        assert_eq!(reader.read_slice(b'\n'), (&b"f"[..], Some(Error::Eof)));
    }

    #[test]
    fn test_read_slice_buffer_full() {
        let data = [b'x'; 40];
        let mut reader = Reader::with_capacity(&data[..], 16, &pool());
        let (bytes, err) = reader.read_slice(b'\n');
        assert_eq!(bytes.len(), 16);
        assert_eq!(err, Some(Error::BufferFull));
    }

    #[test]
    fn test_read_line_strips_terminators() {
        let mut reader = Reader::new(&b"one\r\ntwo\nthree"[..], &pool());
        assert_eq!(reader.read_line().unwrap(), (&b"one"[..], false));
        assert_eq!(reader.read_line().unwrap(), (&b"two"[..], false));
        assert_eq!(reader.read_line().unwrap(), (&b"three"[..], false));
        assert_eq!(reader.read_line(), Err(Error::Eof));
    }

    #[test]
    fn test_read_line_long_line_is_prefixed() {
        let mut input = vec![b'a'; 20];
        input.extend_from_slice(b"\nz\n");
        let mut reader = Reader::with_capacity(&input[..], 16, &pool());
        let (first, prefix) = reader.read_line().unwrap();
        assert_eq!(first, &[b'a'; 16][..]);
        assert!(prefix);
        assert_eq!(reader.read_line().unwrap(), (&b"aaaa"[..], false));
        assert_eq!(reader.read_line().unwrap(), (&b"z"[..], false));
    }

    #[test]
    fn test_read_line_crlf_straddling_fragment() {
        // 15 bytes of text, then "\r" lands as the 16th byte of the buffer.
        let mut input = vec![b'b'; 15];
        input.extend_from_slice(b"\r\nnext\n");
        let mut reader = Reader::with_capacity(&input[..], 16, &pool());

        let (first, prefix) = reader.read_line().unwrap();
        assert_eq!(first, &[b'b'; 15][..]);
        assert!(prefix);
        // The held-back "\r" pairs with "\n": an empty final fragment.
        assert_eq!(reader.read_line().unwrap(), (&b""[..], false));
        assert_eq!(reader.read_line().unwrap(), (&b"next"[..], false));
    }

    #[test]
    fn test_read_bytes_accumulates_full_buffers() {
        let mut input = vec![b'q'; 50];
        input.push(b';');
        input.extend_from_slice(b"rest");
        let mut reader = Reader::with_capacity(&input[..], 16, &pool());

        let (record, err) = reader.read_bytes(b';');
        assert!(err.is_none());
        assert_eq!(record.len(), 51);
        assert_eq!(record.last(), Some(&b';'));

        let (tail, err) = reader.read_bytes(b';');
        assert_eq!(tail, b"rest");
        assert_eq!(err, Some(Error::Eof));
    }

    #[test]
    fn test_read_string_then_eof() {
        let mut reader = Reader::new(&b"abc\ndef"[..], &pool());
        assert_eq!(reader.read_string(b'\n'), ("abc\n".to_string(), None));
        assert_eq!(reader.read_string(b'\n'), ("def".to_string(), Some(Error::Eof)));
    }

    #[test]
    fn test_read_slice_invalidates_unread_rune() {
        let mut reader = Reader::new("é\nx".as_bytes(), &pool());
        reader.read_rune().unwrap();
        reader.read_slice(b'\n');
        assert_eq!(reader.unread_rune(), Err(Error::InvalidUnreadRune));
        reader.unread_byte().unwrap();
        assert_eq!(reader.read_byte().unwrap(), b'\n');
    }
}
