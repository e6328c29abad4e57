// src/read_writer.rs
//! A Reader and a Writer over the two halves of one stream.

use crate::error::Error;
use crate::reader::Reader;
use crate::stream::{ByteSink, ByteSource};
use crate::writer::Writer;

/// Pairs a [`Reader`] with a [`Writer`].
///
/// There is no shared state: reads go to the Reader, writes to the Writer.
#[derive(Debug)]
pub struct ReadWriter<R, W> {
    reader: Reader<R>,
    writer: Writer<W>,
}

impl<R, W> ReadWriter<R, W> {
    /// Combines the two halves.
    pub fn new(reader: Reader<R>, writer: Writer<W>) -> Self {
        Self { reader, writer }
    }

    /// The reading half.
    pub fn reader(&mut self) -> &mut Reader<R> {
        &mut self.reader
    }

    /// The writing half.
    pub fn writer(&mut self) -> &mut Writer<W> {
        &mut self.writer
    }

    /// Splits back into the two halves.
    pub fn into_parts(self) -> (Reader<R>, Writer<W>) {
        (self.reader, self.writer)
    }
}

impl<R: ByteSource, W> ByteSource for ReadWriter<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        self.reader.read(buf)
    }

    fn write_to(&mut self, sink: &mut dyn ByteSink) -> Option<(u64, Option<Error>)> {
        Some(self.reader.write_to(sink))
    }
}

impl<R, W: ByteSink> ByteSink for ReadWriter<R, W> {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        self.writer.write(buf)
    }

    fn read_from(&mut self, source: &mut dyn ByteSource) -> Option<(u64, Option<Error>)> {
        Some(self.writer.read_from(source))
    }
}

impl<R: ByteSource, W> std::io::Read for ReadWriter<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        std::io::Read::read(&mut self.reader, buf)
    }
}

impl<R: ByteSource, W> std::io::BufRead for ReadWriter<R, W> {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        std::io::BufRead::fill_buf(&mut self.reader)
    }

    fn consume(&mut self, amt: usize) {
        std::io::BufRead::consume(&mut self.reader, amt)
    }
}

impl<R, W: ByteSink> std::io::Write for ReadWriter<R, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write(&mut self.writer, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::Write::flush(&mut self.writer)
    }
}
