use std::fs;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gelfchunk::workers::WorkerPool;
use gelfchunk_client::{Client, Config};
use gelfchunk_transport::{resolve, PacketTransport, UdpTransport};
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{client_error, io_error, transport_error, CliResult, SUCCESS};
use crate::output::{hex, print_summary, OutputFormat, SendSummary};

/// Counts what actually reached the socket.
struct Counted<T> {
    inner: T,
    datagrams: AtomicU64,
    bytes: AtomicU64,
}

impl<T> Counted<T> {
    fn new(inner: T) -> Self {
        Self {
            inner,
            datagrams: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }
}

impl<T: PacketTransport> PacketTransport for Counted<T> {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> gelfchunk_transport::Result<usize> {
        let written = self.inner.send_to(packet, addr)?;
        self.datagrams.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(written as u64, Ordering::Relaxed);
        Ok(written)
    }
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let server = resolve(&args.server).map_err(|err| transport_error("invalid server", err))?;
    let socket = match args.bind {
        Some(local) => UdpTransport::bind(local),
        None => UdpTransport::bind_for(server),
    }
    .map_err(|err| transport_error("bind failed", err))?;

    let config = Config::new(server, Counted::new(socket))
        .with_compression_level(args.level)
        .with_strategy(args.strategy.into());
    let client =
        Arc::new(Client::new(config).map_err(|err| client_error("client setup failed", err))?);

    let payload = read_payload(&args)?;
    let lines = message_lines(&payload);
    debug!(messages = lines.len(), %server, "sending");

    let workers = match args.workers {
        Some(capacity) => {
            let pool = WorkerPool::new(capacity, Arc::clone(&client));
            for line in &lines {
                pool.submit(line)
                    .map_err(|err| io_error("send failed", err))?;
            }
            pool.capacity()
        }
        None => {
            for line in &lines {
                client
                    .send(line)
                    .map_err(|err| client_error("send failed", err))?;
            }
            0
        }
    };

    let counted = client.transport();
    let summary = SendSummary {
        server: server.to_string(),
        instance: hex(&client.instance()),
        strategy: format!("{:?}", client.strategy()).to_lowercase(),
        workers,
        messages: lines.len() as u64,
        payload_bytes: lines.iter().map(|line| line.len() as u64).sum(),
        datagrams: counted.datagrams.load(Ordering::Relaxed),
        wire_bytes: counted.bytes.load(Ordering::Relaxed),
    };
    print_summary(&summary, format);

    Ok(SUCCESS)
}

fn read_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buf)
}

/// Split input into newline-terminated messages, skipping empty lines.
fn message_lines(payload: &[u8]) -> Vec<Vec<u8>> {
    payload
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut message = Vec::with_capacity(line.len() + 1);
            message.extend_from_slice(line);
            message.push(b'\n');
            message
        })
        .collect()
}
