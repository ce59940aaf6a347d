use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Datagram size assumed deliverable without fragmentation.
pub const MTU_SIZE: usize = 1500;

/// Maximum compressed bytes carried by one chunk (MTU minus header and IP/UDP headroom).
pub const MAX_CHUNK_SIZE: usize = 1420;

/// Maximum number of chunks per message.
pub const MAX_CHUNK_COUNT: usize = 128;

/// Largest compressed message that fits in [`MAX_CHUNK_COUNT`] chunks.
pub const MAX_MESSAGE_SIZE: usize = MAX_CHUNK_COUNT * MAX_CHUNK_SIZE;

/// Chunked GELF magic bytes.
pub const MAGIC: [u8; 2] = [0x1e, 0x0f];

/// Chunk header: magic (2) + message id (8) + index (1) + count (1) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Identifier shared by every chunk of one message.
///
/// The first four bytes are the sending client's instance tag, the last four
/// a little-endian per-client sequence number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageId([u8; 8]);

impl MessageId {
    /// Build an id from an instance tag and a sequence number.
    pub fn new(instance: [u8; 4], sequence: u32) -> Self {
        let mut id = [0u8; 8];
        id[..4].copy_from_slice(&instance);
        id[4..].copy_from_slice(&sequence.to_le_bytes());
        Self(id)
    }

    /// Wrap raw id bytes as read off the wire.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// The client instance tag.
    pub fn instance(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// The per-client sequence number.
    pub fn sequence(&self) -> u32 {
        u32::from_le_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({self})")
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Per-chunk routing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Message this chunk belongs to.
    pub id: MessageId,
    /// Zero-based position of this chunk.
    pub index: u8,
    /// Total number of chunks in the message.
    pub count: u8,
}

/// One framed fragment of a compressed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub header: ChunkHeader,
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    /// The total wire size of this chunk (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Number of chunks needed for `len` compressed bytes.
///
/// Fails with [`FrameError::MessageTooLarge`] above [`MAX_CHUNK_COUNT`] chunks.
pub fn chunk_count(len: usize) -> Result<u8> {
    let mut count = len / MAX_CHUNK_SIZE;
    if len % MAX_CHUNK_SIZE > 0 {
        count += 1;
    }
    if count > MAX_CHUNK_COUNT {
        return Err(FrameError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(count as u8)
}

/// Encode a chunk into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────────────┬───────┬───────┬────────────────┐
/// │ Magic (2B) │ Message ID (8B)  │ Index │ Count │ Payload        │
/// │ 0x1e 0x0f  │ tag(4) ‖ seq(4LE)│ (1B)  │ (1B)  │ (≤ 1420 bytes) │
/// └────────────┴──────────────────┴───────┴───────┴────────────────┘
/// ```
pub fn encode_chunk(chunk: &Chunk<'_>, dst: &mut BytesMut) {
    dst.reserve(chunk.wire_size());
    dst.put_slice(&MAGIC);
    dst.put_slice(chunk.header.id.as_bytes());
    dst.put_u8(chunk.header.index);
    dst.put_u8(chunk.header.count);
    dst.put_slice(chunk.payload);
}

/// Decode one datagram into a chunk borrowing its payload.
pub fn decode_chunk(datagram: &[u8]) -> Result<Chunk<'_>> {
    if datagram.len() < HEADER_SIZE || datagram.len() > HEADER_SIZE + MAX_CHUNK_SIZE {
        return Err(FrameError::InvalidLength {
            len: datagram.len(),
        });
    }

    let mut src = datagram;
    let mut magic = [0u8; 2];
    src.copy_to_slice(&mut magic);
    if magic != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let mut id = [0u8; 8];
    src.copy_to_slice(&mut id);
    let index = src.get_u8();
    let count = src.get_u8();

    if count == 0 || usize::from(count) > MAX_CHUNK_COUNT || index >= count {
        return Err(FrameError::InvalidSequence { index, count });
    }

    Ok(Chunk {
        header: ChunkHeader {
            id: MessageId::from_bytes(id),
            index,
            count,
        },
        payload: src,
    })
}
