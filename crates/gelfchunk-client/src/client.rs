use std::io;
use std::net::SocketAddr;

use gelfchunk_frame::{
    CompressionLevel, IdentityCounter, MessageId, PoolStrategy, ResourcePool,
    DEFAULT_COMPRESSION,
};
use gelfchunk_transport::PacketTransport;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::transmit::Transmitter;

/// Settings for [`Client::new`].
#[derive(Debug, Clone)]
pub struct Config<T> {
    /// Where datagrams are sent. Required.
    pub server_addr: Option<SocketAddr>,
    /// Packet transport used for every send. Required.
    pub transport: Option<T>,
    /// Raw gzip level: `-1` (default), `0` (none) or `1..=9`.
    pub compression_level: i32,
    /// How concurrent writes share encoding buffers.
    pub strategy: PoolStrategy,
}

impl<T> Default for Config<T> {
    fn default() -> Self {
        Self {
            server_addr: None,
            transport: None,
            compression_level: DEFAULT_COMPRESSION,
            strategy: PoolStrategy::default(),
        }
    }
}

impl<T> Config<T> {
    /// Config with both required fields set and defaults elsewhere.
    pub fn new(server_addr: SocketAddr, transport: T) -> Self {
        Self {
            server_addr: Some(server_addr),
            transport: Some(transport),
            ..Self::default()
        }
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_strategy(mut self, strategy: PoolStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// What one successful write put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Receipt {
    /// Id shared by the message's chunks; `None` for an empty write.
    pub message_id: Option<MessageId>,
    /// Trimmed payload bytes consumed by the compressor.
    pub consumed: usize,
    /// Datagrams sent.
    pub chunks: u8,
}

/// Writes newline-terminated log lines as chunked GELF datagrams.
///
/// A client is shared between threads by reference (or `Arc`); every method
/// takes `&self`. All work for one write happens on the calling thread.
pub struct Client<T> {
    addr: SocketAddr,
    transport: T,
    ids: IdentityCounter,
    pool: ResourcePool,
}

impl<T: PacketTransport> Client<T> {
    /// Validate `config` and seed the instance tag from the OS random source.
    pub fn new(config: Config<T>) -> Result<Self> {
        Self::with_rng(config, &mut OsRng)
    }

    /// Like [`Client::new`] with an explicit cryptographic random source.
    pub fn with_rng<R: RngCore + CryptoRng>(config: Config<T>, rng: &mut R) -> Result<Self> {
        let transport = config.transport.ok_or(ClientError::MissingTransport)?;
        let addr = config.server_addr.ok_or(ClientError::MissingServerAddr)?;
        let level = CompressionLevel::new(config.compression_level)?;

        let mut instance = [0u8; 4];
        rng.try_fill_bytes(&mut instance)
            .map_err(ClientError::Random)?;

        debug!(
            server = %addr,
            level = level.get(),
            strategy = ?config.strategy,
            instance = ?instance,
            "created gelf client"
        );

        Ok(Self {
            addr,
            transport,
            ids: IdentityCounter::new(instance),
            pool: ResourcePool::new(level, config.strategy),
        })
    }

    /// Send one newline-terminated payload as a GELF message.
    ///
    /// Returns the number of trimmed bytes consumed by the compressor. An
    /// empty payload is a no-op returning `0`.
    pub fn send(&self, payload: &[u8]) -> Result<usize> {
        self.dispatch(payload).map(|receipt| receipt.consumed)
    }

    /// Like [`send`](Self::send), reporting the id and chunk count as well.
    pub fn dispatch(&self, payload: &[u8]) -> Result<Receipt> {
        if payload.is_empty() {
            return Ok(Receipt::default());
        }
        if !payload.ends_with(b"\n") {
            return Err(ClientError::MissingNewline);
        }

        let mut resource = self.pool.acquire();
        let encoded = resource.encode(payload)?;

        let id = self.ids.next_id();
        let (chunks, packet) = resource.emit(id);
        let sent = Transmitter::new(&self.transport, &self.addr).send_chunks(chunks, packet)?;

        debug!(%id, chunks = sent, compressed = encoded.compressed_len, "sent message");
        Ok(Receipt {
            message_id: Some(id),
            consumed: encoded.consumed,
            chunks: sent,
        })
    }

    /// Random tag identifying this client in every message id.
    pub fn instance(&self) -> [u8; 4] {
        self.ids.instance()
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn compression_level(&self) -> i32 {
        self.pool.level().get()
    }

    pub fn strategy(&self) -> PoolStrategy {
        self.pool.strategy()
    }

    /// Encoding resources parked for reuse.
    pub fn idle_resources(&self) -> usize {
        self.pool.idle()
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.addr)
            .field("instance", &self.ids.instance())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// One `write` call is one message. A successful write reports the whole
/// buffer as written so `write_all` never resubmits a tail.
impl<T: PacketTransport> io::Write for &Client<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: PacketTransport> io::Write for Client<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
