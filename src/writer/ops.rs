// src/writer/ops.rs
//! Write operations, bulk intake from a source, and trait impls.

use super::core::Writer;
use crate::error::{Error, Result};
use crate::stream::{ByteSink, ByteSource};
use crate::utf8;

impl<W: ByteSink> Writer<W> {
    /// Copies as much of `src` as fits into the buffer.
    fn copy_in(&mut self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }
        let spare = self.spare();
        let n = spare.len().min(src.len());
        spare[..n].copy_from_slice(&src[..n]);
        self.n += n;
        n
    }

    /// Writes `src`, returning how many bytes were accepted.
    ///
    /// Small writes are queued. A write that does not fit flushes the buffer
    /// as it goes, and one larger than the whole buffer goes straight to the
    /// sink when nothing is queued. The error is `Some` whenever fewer than
    /// `src.len()` bytes were accepted; once the sink has failed, nothing more
    /// is accepted.
    ///
    /// # Panics
    ///
    /// Panics if the sink reports more bytes than it was offered.
    pub fn write(&mut self, mut src: &[u8]) -> (usize, Option<Error>) {
        let mut total = 0;
        while src.len() > self.available() && self.err.is_none() {
            let n = if self.n == 0 {
                // Large write, empty buffer: skip the copy.
                let (n, err) = self.inner.write(src);
                assert!(
                    n <= src.len(),
                    "bufio: sink accepted {} bytes of {} offered",
                    n,
                    src.len()
                );
                match err {
                    Some(err) => self.latch(err),
                    None if n < src.len() => self.latch(Error::ShortWrite),
                    None => {}
                }
                n
            } else {
                let n = self.copy_in(src);
                let _ = self.flush_buf();
                n
            };
            total += n;
            src = &src[n..];
        }
        if let Err(err) = self.sticky() {
            return (total, Some(err));
        }
        total += self.copy_in(src);
        (total, None)
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, c: u8) -> Result<()> {
        self.sticky()?;
        if self.available() == 0 {
            self.flush_buf()?;
        }
        self.spare()[0] = c;
        self.n += 1;
        Ok(())
    }

    /// Writes the UTF-8 encoding of `c`, returning its width.
    pub fn write_rune(&mut self, c: char) -> Result<usize> {
        if (c as u32) < u32::from(utf8::RUNE_SELF) {
            self.write_byte(c as u8)?;
            return Ok(1);
        }
        self.sticky()?;
        if self.available() < utf8::UTF_MAX {
            self.flush_buf()?;
            if self.available() < utf8::UTF_MAX {
                // Only a tiny buffer gets here.
                let mut tmp = [0u8; utf8::UTF_MAX];
                return match self.write_str(c.encode_utf8(&mut tmp)) {
                    (n, None) => Ok(n),
                    (_, Some(err)) => Err(err),
                };
            }
        }
        let width = c.encode_utf8(self.spare()).len();
        self.n += width;
        Ok(width)
    }

    /// Writes a string; same contract as [`write`](Self::write).
    pub fn write_str(&mut self, s: &str) -> (usize, Option<Error>) {
        self.write(s.as_bytes())
    }

    /// Pulls everything from `source` through the buffer until it runs dry.
    ///
    /// With nothing queued and a sink that supports bulk intake, the whole
    /// transfer is handed to the sink. Otherwise bytes are read straight into
    /// the buffer, flushing whenever it fills. A read of zero bytes ends the
    /// loop; end-of-stream is not an error.
    ///
    /// # Panics
    ///
    /// Panics if the source reports more bytes than it was offered.
    pub fn read_from(&mut self, source: &mut dyn ByteSource) -> (u64, Option<Error>) {
        if let Err(err) = self.sticky() {
            return (0, Some(err));
        }
        if self.n == 0 {
            if let Some(result) = self.inner.read_from(&mut *source) {
                return result;
            }
        }

        let mut total = 0u64;
        let err = loop {
            if self.available() == 0 {
                if let Err(err) = self.flush_buf() {
                    return (total, Some(err));
                }
            }
            let spare = self.spare();
            let offered = spare.len();
            let (m, err) = source.read(spare);
            assert!(
                m <= offered,
                "bufio: source returned {} bytes for a {} byte buffer",
                m,
                offered
            );
            if m == 0 {
                break err;
            }
            self.n += m;
            total += m as u64;
            if err.is_some() {
                break err;
            }
        };

        match err {
            // A buffer filled exactly at end-of-stream is flushed right away.
            Some(Error::Eof) if self.available() == 0 => (total, self.flush_buf().err()),
            Some(Error::Eof) => (total, None),
            err => (total, err),
        }
    }
}

impl<W: ByteSink> ByteSink for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        Writer::write(self, buf)
    }

    fn read_from(&mut self, source: &mut dyn ByteSource) -> Option<(u64, Option<Error>)> {
        Some(Writer::read_from(self, source))
    }
}

impl<W: ByteSink> std::io::Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match Writer::write(self, buf) {
            // A latched error comes back on the next call.
            (n, _) if n > 0 => Ok(n),
            (_, None) => Ok(0),
            (_, Some(err)) => Err(err.into()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Writer::flush(self).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::pool::BufferPool;
    use crate::stream::{ByteSink, ByteSource};
    use crate::writer::Writer;
    use std::sync::Arc;

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::default())
    }

    /// Records every write call separately; no bulk intake.
    #[derive(Default)]
    struct Calls(Vec<Vec<u8>>);

    impl Calls {
        fn joined(&self) -> Vec<u8> {
            self.0.concat()
        }
    }

    impl ByteSink for Calls {
        fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
            self.0.push(buf.to_vec());
            (buf.len(), None)
        }
    }

    /// Hands out its data together with end-of-stream.
    struct Final<'a>(&'a [u8]);

    impl ByteSource for Final<'_> {
        fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            let err = self.0.is_empty().then_some(Error::Eof);
            (n, err)
        }
    }

    #[test]
    fn test_small_writes_coalesce() {
        let mut writer = Writer::with_capacity(Calls::default(), 16, &pool());
        for chunk in [&b"ab"[..], &b"cd"[..], &b"ef"[..]] {
            assert_eq!(writer.write(chunk), (2, None));
        }
        assert!(writer.get_ref().0.is_empty());
        writer.flush().unwrap();
        assert_eq!(writer.get_ref().0, vec![b"abcdef".to_vec()]);
    }

    #[test]
    fn test_overflowing_write_flushes_then_queues() {
        let mut writer = Writer::with_capacity(Calls::default(), 8, &pool());
        writer.write(b"12345");
        assert_eq!(writer.write(b"6789abc"), (7, None));
        assert_eq!(writer.get_ref().0, vec![b"12345678".to_vec()]);
        assert_eq!(writer.buffered(), 4);
    }

    #[test]
    fn test_large_write_bypasses_buffer() {
        let mut writer = Writer::with_capacity(Calls::default(), 8, &pool());
        let payload = [b'z'; 20];
        assert_eq!(writer.write(&payload), (20, None));
        assert_eq!(writer.get_ref().0.len(), 1);
        assert_eq!(writer.buffered(), 0);
        assert!(writer.buf.is_none());
    }

    #[test]
    fn test_direct_short_write_latches() {
        struct Half;
        impl ByteSink for Half {
            fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
                (buf.len() / 2, None)
            }
        }
        let mut writer = Writer::with_capacity(Half, 4, &pool());
        assert_eq!(writer.write(&[0u8; 10]), (5, Some(Error::ShortWrite)));
        assert_eq!(writer.write(b"a"), (0, Some(Error::ShortWrite)));
    }

    #[test]
    fn test_write_byte_flushes_when_full() {
        let mut writer = Writer::with_capacity(Calls::default(), 2, &pool());
        for c in *b"abc" {
            writer.write_byte(c).unwrap();
        }
        assert_eq!(writer.get_ref().0, vec![b"ab".to_vec()]);
        writer.flush().unwrap();
        assert_eq!(writer.get_ref().joined(), b"abc");
    }

    #[test]
    fn test_write_rune_widths() {
        let mut writer = Writer::new(Vec::new(), &pool());
        assert_eq!(writer.write_rune('a').unwrap(), 1);
        assert_eq!(writer.write_rune('é').unwrap(), 2);
        assert_eq!(writer.write_rune('日').unwrap(), 3);
        assert_eq!(writer.write_rune('😀').unwrap(), 4);
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), "aé日😀".as_bytes());
    }

    #[test]
    fn test_write_rune_flushes_for_room() {
        let mut writer = Writer::with_capacity(Calls::default(), 6, &pool());
        writer.write(b"abc");
        assert_eq!(writer.write_rune('😀').unwrap(), 4);
        assert_eq!(writer.get_ref().0, vec![b"abc".to_vec()]);
        assert_eq!(writer.buffered(), 4);
    }

    #[test]
    fn test_write_rune_tiny_buffer() {
        let mut writer = Writer::with_capacity(Vec::new(), 2, &pool());
        assert_eq!(writer.write_rune('日').unwrap(), 3);
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), "日".as_bytes());
    }

    #[test]
    fn test_read_from_delegates_to_bulk_sink() {
        let mut writer = Writer::with_capacity(Vec::new(), 16, &pool());
        let data = vec![3u8; 100];
        let mut src: &[u8] = &data;
        assert_eq!(writer.read_from(&mut src), (100, None));
        // Went straight to the Vec, nothing queued.
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.get_ref().len(), 100);
    }

    #[test]
    fn test_read_from_through_buffer() {
        let mut writer = Writer::with_capacity(Calls::default(), 16, &pool());
        writer.write(b">");
        let data: Vec<u8> = (0..40u8).collect();
        let mut src: &[u8] = &data;
        assert_eq!(writer.read_from(&mut src), (40, None));
        writer.flush().unwrap();

        let mut expected = vec![b'>'];
        expected.extend_from_slice(&data);
        assert_eq!(writer.get_ref().joined(), expected);
    }

    #[test]
    fn test_read_from_exact_fill_at_eof_flushes() {
        let mut writer = Writer::with_capacity(Calls::default(), 8, &pool());
        assert_eq!(writer.read_from(&mut Final(b"12345678")), (8, None));
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.get_ref().0, vec![b"12345678".to_vec()]);
    }

    #[test]
    fn test_read_from_partial_fill_at_eof_stays_queued() {
        let mut writer = Writer::with_capacity(Calls::default(), 8, &pool());
        assert_eq!(writer.read_from(&mut Final(b"123")), (3, None));
        assert_eq!(writer.buffered(), 3);
        assert!(writer.get_ref().0.is_empty());
    }

    #[test]
    fn test_std_write_macro() {
        use std::io::Write;
        let mut writer = Writer::new(Vec::new(), &pool());
        write!(writer, "{}-{}", 1, "two").unwrap();
        Write::flush(&mut writer).unwrap();
        assert_eq!(writer.get_ref(), b"1-two");
    }
}
