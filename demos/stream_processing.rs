// demos/stream_processing.rs
//! Line-oriented stream processing with long records and bulk copies

use pooled_bufio::prelude::*;
use std::sync::Arc;

/// Hands out the input a few bytes at a time, like a slow pipe.
struct Pipe {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ByteSource for Pipe {
    fn read(&mut self, buf: &mut [u8]) -> (usize, Option<Error>) {
        if self.pos == self.data.len() {
            return (0, Some(Error::Eof));
        }
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        (n, None)
    }
}

fn main() -> Result<()> {
    println!("=== Stream Processing ===\n");

    let pool = Arc::new(BufferPool::default());

    let mut input = Vec::new();
    for i in 0..5 {
        input.extend_from_slice(format!("event {} ok\r\n", i).as_bytes());
    }
    input.extend_from_slice(&[b'x'; 40]);
    input.extend_from_slice(b"\nlast line without newline");

    let pipe = Pipe { data: input, pos: 0, chunk: 7 };
    let mut reader = Reader::with_capacity(pipe, 16, &pool);

    // read_line hands back fragments of lines longer than the buffer.
    let mut fragments = 0;
    loop {
        match reader.read_line() {
            Ok((line, true)) => {
                fragments += 1;
                println!("  fragment: {:?}", String::from_utf8_lossy(line));
            }
            Ok((line, false)) => println!("line: {:?}", String::from_utf8_lossy(line)),
            Err(Error::Eof) => break,
            Err(err) => return Err(err),
        }
    }
    println!("\nLong-line fragments: {}", fragments);

    println!("\n=== Record Splitting ===\n");

    let csv = b"id,name,score;1,ada,99;2,grace,97;3,linus,95";
    let mut reader = Reader::new(&csv[..], &pool);
    loop {
        let (record, err) = reader.read_string(b';');
        let fields: Vec<&str> = record.trim_end_matches(';').split(',').collect();
        println!("Record: {:?}", fields);
        if err.is_some() {
            break;
        }
    }

    println!("\n=== Bulk Copy ===\n");

    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();
    let mut reader = Reader::new(ReadSource(std::io::Cursor::new(payload.clone())), &pool);
    let mut writer = Writer::with_capacity(WriteSink(Vec::new()), 1024, &pool);

    let (copied, err) = reader.write_to(&mut writer);
    if let Some(err) = err {
        return Err(err);
    }
    writer.flush()?;

    let out = writer.into_inner().map_err(|(err, _)| err)?.into_inner();
    println!("Copied {} bytes, identical: {}", copied, out == payload);

    Ok(())
}
