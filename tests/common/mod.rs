// tests/common/mod.rs
//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use pooled_bufio::{ByteSink, ByteSource, Error};

/// Serves `data` in pieces whose sizes cycle through `chunks`, then reports
/// end-of-stream on the following call.
pub struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunks: Vec<usize>,
    next: usize,
    pub reads: usize,
}

impl ChunkedSource {
    pub fn new(data: impl Into<Vec<u8>>, chunks: &[usize]) -> Self {
        assert!(chunks.iter().all(|&c| c > 0), "chunk sizes must be positive");
        Self {
            data: data.into(),
            pos: 0,
            chunks: chunks.to_vec(),
            next: 0,
            reads: 0,
        }
    }
}

impl ByteSource for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        self.reads += 1;
        if self.pos == self.data.len() {
            return (0, Some(Error::Eof));
        }
        let chunk = self.chunks[self.next % self.chunks.len()];
        self.next += 1;
        let n = chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        (n, None)
    }
}

/// Accepts everything, remembering each call; no bulk intake.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<Vec<u8>>,
}

impl RecordingSink {
    pub fn bytes(&self) -> Vec<u8> {
        self.calls.concat()
    }
}

impl ByteSink for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        self.calls.push(buf.to_vec());
        (buf.len(), None)
    }
}

/// Fails every write with the same error, counting attempts.
#[derive(Debug)]
pub struct FailingSink {
    pub err: Error,
    pub attempts: usize,
}

impl FailingSink {
    pub fn new(message: &str) -> Self {
        Self {
            err: Error::other(message.to_string()),
            attempts: 0,
        }
    }
}

impl ByteSink for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> (usize, Option<Error>) {
        self.attempts += 1;
        (0, Some(self.err.clone()))
    }
}
