/// Errors that can occur while encoding or decoding GELF chunks.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The compression level is outside the legal range.
    #[error("compression level of {0} is not a valid compression level")]
    InvalidCompressionLevel(i32),

    /// The compressed message needs more chunks than the protocol allows.
    #[error("message exceeds maximum size, {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// The compressor failed while consuming or finalizing a payload.
    #[error("compressing message: {0}")]
    Compression(#[source] std::io::Error),

    /// A datagram does not start with the GELF chunk magic bytes.
    #[error("invalid chunk magic (expected 0x1e 0x0f)")]
    InvalidMagic,

    /// A datagram is shorter than the chunk header or longer than a chunk.
    #[error("invalid chunk length ({len} bytes)")]
    InvalidLength { len: usize },

    /// The header's sequence fields are inconsistent.
    #[error("invalid chunk sequence {index} of {count}")]
    InvalidSequence { index: u8, count: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
