//! Several producer threads logging through a pool of buffered writers.
//!
//! Run a local collector (or `nc -ul 12201 | xxd`) and then:
//!   cargo run --example worker-pool -- 127.0.0.1:12201

use std::io::Write;
use std::sync::Arc;
use std::thread;

use gelfchunk::client::{Client, Config, PoolStrategy};
use gelfchunk::transport::{resolve, UdpTransport};
use gelfchunk::workers::WorkerPool;

const PRODUCERS: usize = 4;
const LINES: usize = 25;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:12201".to_string());
    let server = resolve(&server)?;

    let transport = UdpTransport::bind_for(server)?;
    let config = Config::new(server, transport).with_strategy(PoolStrategy::Checkout);
    let client = Arc::new(Client::new(config)?);
    let pool = Arc::new(WorkerPool::new(3, client));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || -> std::io::Result<()> {
                let mut writer = &*pool;
                for line in 0..LINES {
                    // One write per message: format first, then hand over the whole line.
                    let message = format!(
                        "{{\"version\":\"1.1\",\"host\":\"example\",\"short_message\":\"producer {producer} line {line}\"}}\n"
                    );
                    writer.write_all(message.as_bytes())?;
                }
                Ok(())
            })
        })
        .collect();

    for producer in producers {
        if let Err(err) = producer.join().map_err(|_| "producer panicked")? {
            eprintln!("producer failed: {err}");
        }
    }
    eprintln!("sent {} messages to {server}", PRODUCERS * LINES);
    Ok(())
}
