// demos/basic_usage.rs
//! Basic usage of the buffered Reader and Writer

use pooled_bufio::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    let pool = Arc::new(BufferPool::default());

    println!("=== Writing ===\n");

    let mut writer = Writer::new(Vec::new(), &pool);
    writer.write_str("name=ferris\n");
    writer.write(b"lang=rust\n");
    writer.write_rune('🦀')?;
    writer.write_byte(b'\n')?;

    println!("Queued bytes: {}", writer.buffered());
    println!("Room left: {}", writer.available());

    writer.flush()?;
    let data = writer.into_inner().map_err(|(err, _)| err)?;
    println!("Sink now holds {} bytes", data.len());

    println!("\n=== Peeking and Unreading ===\n");

    let mut reader = Reader::new(&data[..], &pool);

    let (head, _) = reader.peek(4);
    println!("Peeked: {:?}", String::from_utf8_lossy(head));

    let first = reader.read_byte()?;
    reader.unread_byte()?;
    println!("Read then pushed back: {:?}", first as char);

    println!("\n=== Reading Records ===\n");

    for _ in 0..2 {
        let (line, is_prefix) = reader.read_line()?;
        println!(
            "Line: {:?} (prefix: {})",
            String::from_utf8_lossy(line),
            is_prefix
        );
    }

    let (c, width) = reader.read_rune()?;
    println!("Rune: {} ({} bytes)", c, width);
    reader.unread_rune()?;
    let (rest, err) = reader.read_string(b'\n');
    println!("Rest: {:?}, error: {:?}", rest, err);

    match reader.read_byte() {
        Err(Error::Eof) => println!("Reached end of stream"),
        other => println!("Unexpected: {:?}", other),
    }

    println!("\n=== Pool Statistics ===\n");

    let stats = pool.stats();
    println!("Acquired: {}", stats.acquired);
    println!("Reused: {}", stats.reused);
    println!("Idle now: {}", stats.available);
    println!("Hit rate: {:.1}%", stats.hit_rate());

    Ok(())
}
