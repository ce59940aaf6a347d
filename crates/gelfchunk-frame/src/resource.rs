use std::iter::FusedIterator;

use bytes::BytesMut;

use crate::codec::{chunk_count, Chunk, ChunkHeader, MessageId, MAX_CHUNK_SIZE, MTU_SIZE};
use crate::compress::{CompressionLevel, GzipStream};
use crate::error::{FrameError, Result};

/// Outcome of compressing one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    /// Trimmed payload bytes consumed by the compressor.
    pub consumed: usize,
    /// Length of the finished gzip stream.
    pub compressed_len: usize,
    /// Chunks needed to carry it.
    pub chunk_count: u8,
}

/// Reusable per-message encoding state: gzip stream, read cursor over its
/// output, and a packet scratch buffer.
///
/// One message at a time: [`encode`](Self::encode), drain
/// [`chunks`](Self::chunks), then [`reset`](Self::reset). Skipping the reset
/// leaks the previous message's bytes into the next one.
#[derive(Debug)]
pub struct EncodingResource {
    stream: GzipStream,
    read_pos: usize,
    packet: BytesMut,
}

impl EncodingResource {
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            stream: GzipStream::with_capacity(level, MAX_CHUNK_SIZE),
            read_pos: 0,
            packet: BytesMut::with_capacity(MTU_SIZE),
        }
    }

    /// Trim, compress and measure `payload`.
    ///
    /// Fails with [`FrameError::MessageTooLarge`] when the result needs more
    /// than the maximum chunk count; no chunk is produced in that case.
    pub fn encode(&mut self, payload: &[u8]) -> Result<Encoded> {
        let trimmed = trim_payload(payload);
        let consumed = self.stream.write(trimmed).map_err(FrameError::Compression)?;
        self.stream.finish().map_err(FrameError::Compression)?;

        let compressed_len = self.stream.compressed().len();
        let chunk_count = chunk_count(compressed_len)?;
        Ok(Encoded {
            consumed,
            compressed_len,
            chunk_count,
        })
    }

    /// Drain the encoded message as chunks tagged with `id`.
    ///
    /// Bytes handed out are consumed: a second call continues after the last
    /// chunk already produced. Yields nothing until [`encode`](Self::encode)
    /// succeeded.
    pub fn chunks(&mut self, id: MessageId) -> Chunks<'_> {
        self.emit(id).0
    }

    /// Like [`chunks`](Self::chunks), also lending the packet scratch buffer.
    pub fn emit(&mut self, id: MessageId) -> (Chunks<'_>, &mut BytesMut) {
        let chunks = Chunks::new(&self.stream, &mut self.read_pos, id);
        (chunks, &mut self.packet)
    }

    /// Release protocol: empty the accumulator and rebind the compressor to it.
    pub fn reset(&mut self) -> Result<()> {
        self.stream.reset().map_err(FrameError::Compression)?;
        self.read_pos = 0;
        self.packet.clear();
        Ok(())
    }

    /// Whether the resource is ready for a new message.
    pub fn is_clean(&self) -> bool {
        self.stream.is_fresh() && self.read_pos == 0 && self.packet.is_empty()
    }

    pub fn level(&self) -> CompressionLevel {
        self.stream.level()
    }
}

/// Lazy, non-restartable sequence of chunks over an encoded message.
#[derive(Debug)]
pub struct Chunks<'a> {
    data: &'a [u8],
    cursor: &'a mut usize,
    id: MessageId,
    count: u8,
}

impl<'a> Chunks<'a> {
    fn new(stream: &'a GzipStream, cursor: &'a mut usize, id: MessageId) -> Self {
        let data: &'a [u8] = if stream.is_finished() {
            stream.compressed()
        } else {
            &[]
        };
        match chunk_count(data.len()) {
            Ok(count) => Self {
                data,
                cursor,
                id,
                count,
            },
            Err(_) => Self {
                data: &[],
                cursor,
                id,
                count: 0,
            },
        }
    }

    /// Total chunks in the message, including ones already drained.
    pub fn total(&self) -> u8 {
        self.count
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(*self.cursor).div_ceil(MAX_CHUNK_SIZE)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let start = *self.cursor;
        if start >= self.data.len() {
            return None;
        }
        let end = (start + MAX_CHUNK_SIZE).min(self.data.len());
        *self.cursor = end;

        let data: &'a [u8] = self.data;
        Some(Chunk {
            header: ChunkHeader {
                id: self.id,
                index: (start / MAX_CHUNK_SIZE) as u8,
                count: self.count,
            },
            payload: &data[start..end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

impl FusedIterator for Chunks<'_> {}

/// Strip leading and trailing Unicode whitespace.
///
/// Only the edges are decoded; bytes that are not valid UTF-8 stop trimming.
pub fn trim_payload(payload: &[u8]) -> &[u8] {
    let mut trimmed = payload;
    while let Some((ch, len)) = first_char(trimmed) {
        if !ch.is_whitespace() {
            break;
        }
        trimmed = &trimmed[len..];
    }
    while let Some((ch, len)) = last_char(trimmed) {
        if !ch.is_whitespace() {
            break;
        }
        trimmed = &trimmed[..trimmed.len() - len];
    }
    trimmed
}

fn first_char(bytes: &[u8]) -> Option<(char, usize)> {
    let len = match *bytes.first()? {
        b if b < 0x80 => 1,
        b if b & 0xe0 == 0xc0 => 2,
        b if b & 0xf0 == 0xe0 => 3,
        b if b & 0xf8 == 0xf0 => 4,
        _ => return None,
    };
    let ch = std::str::from_utf8(bytes.get(..len)?).ok()?.chars().next()?;
    Some((ch, len))
}

fn last_char(bytes: &[u8]) -> Option<(char, usize)> {
    let end = bytes.len();
    for len in 1..=end.min(4) {
        let start = end - len;
        if bytes[start] & 0xc0 != 0x80 {
            let ch = std::str::from_utf8(&bytes[start..]).ok()?.chars().next()?;
            return Some((ch, len));
        }
    }
    None
}
