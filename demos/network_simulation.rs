// demos/network_simulation.rs
//! Simulates many short-lived connections sharing one buffer pool

use pooled_bufio::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// A connection that breaks after accepting `budget` bytes.
struct FlakyLink {
    sent: Vec<u8>,
    budget: usize,
}

impl ByteSink for FlakyLink {
    fn write(&mut self, buf: &[u8]) -> (usize, Option<Error>) {
        let n = buf.len().min(self.budget);
        self.sent.extend_from_slice(&buf[..n]);
        self.budget -= n;
        if n < buf.len() {
            let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
            return (n, Some(reset.into()));
        }
        (n, None)
    }
}

fn handle_request(request: &[u8], pool: &Arc<BufferPool>) -> Result<Vec<u8>> {
    let mut conn = ReadWriter::new(Reader::new(request, pool), Writer::new(Vec::new(), pool));

    let (request_line, _) = conn.reader().read_line()?;
    let path = String::from_utf8_lossy(request_line)
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    // Skip headers up to the blank line.
    loop {
        let (header, _) = conn.reader().read_line()?;
        if header.is_empty() {
            break;
        }
    }

    let body = format!("you asked for {}\n", path);
    let writer = conn.writer();
    writer.write_str("HTTP/1.0 200 OK\r\n");
    writer.write_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    writer.write_str(&body);
    writer.flush()?;

    let (_, writer) = conn.into_parts();
    writer.into_inner().map_err(|(err, _)| err)
}

fn main() -> Result<()> {
    // RUST_LOG=pooled_bufio=debug shows the Writer latching errors
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Connection Simulation ===\n");

    let pool = Arc::new(BufferPool::new(PoolConfig {
        buffer_size: 4096,
        max_pool_size: 16,
        min_pool_size: 4,
    }));

    let num_threads = 4;
    let per_thread = 2_500;
    let start = Instant::now();

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || -> Result<usize> {
                let mut bytes = 0;
                for i in 0..per_thread {
                    let request = format!(
                        "GET /item/{}/{} HTTP/1.0\r\nHost: example\r\n\r\n",
                        t, i
                    );
                    bytes += handle_request(request.as_bytes(), &pool)?.len();
                }
                Ok(bytes)
            })
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        total += handle.join().expect("worker panicked")?;
    }

    let elapsed = start.elapsed();
    let requests = num_threads * per_thread;
    println!("Handled {} requests in {:?}", requests, elapsed);
    println!("Response bytes: {}", total);
    println!(
        "Throughput: {:.0} requests/sec",
        requests as f64 / elapsed.as_secs_f64()
    );

    let stats = pool.stats();
    println!("\nPool statistics:");
    println!("  Acquired: {}", stats.acquired);
    println!("  Reused: {}", stats.reused);
    println!("  Allocated: {}", stats.allocated);
    println!("  Hit rate: {:.2}%", stats.hit_rate());

    println!("\n=== Broken Connection ===\n");

    let link = FlakyLink { sent: Vec::new(), budget: 10 };
    let mut writer = Writer::with_capacity(link, 8, &pool);
    let (accepted, err) = writer.write(b"0123456789abcdefghij");
    println!("Accepted {} bytes, error: {:?}", accepted, err);
    println!("Later write: {:?}", writer.write(b"more"));
    println!("Flush: {:?}", writer.flush());
    println!("Delivered: {:?}", String::from_utf8_lossy(&writer.get_ref().sent));

    Ok(())
}
