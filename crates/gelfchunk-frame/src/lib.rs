//! GELF chunk framing with pooled, reusable encoding buffers.
//!
//! This is the core of gelfchunk. A message is trimmed, gzip-compressed and
//! split into chunks of at most [`MAX_CHUNK_SIZE`] bytes, each prefixed with:
//! - The 2-byte chunked-GELF magic (`0x1e 0x0f`)
//! - An 8-byte message id (instance tag + little-endian sequence number)
//! - A 1-byte sequence index and a 1-byte total chunk count
//!
//! [`ResourcePool`] keeps compressors and buffers alive between messages so a
//! steady stream of writes does not allocate per message.

pub mod codec;
pub mod compress;
pub mod error;
pub mod id;
pub mod pool;
pub mod resource;

pub use codec::{
    chunk_count, decode_chunk, encode_chunk, Chunk, ChunkHeader, MessageId, HEADER_SIZE, MAGIC,
    MAX_CHUNK_COUNT, MAX_CHUNK_SIZE, MAX_MESSAGE_SIZE, MTU_SIZE,
};
pub use compress::{
    CompressionLevel, GzipStream, BEST_COMPRESSION, BEST_SPEED, DEFAULT_COMPRESSION,
    NO_COMPRESSION,
};
pub use error::{FrameError, Result};
pub use id::IdentityCounter;
pub use pool::{PoolStrategy, PooledResource, ResourcePool};
pub use resource::{trim_payload, Chunks, Encoded, EncodingResource};
