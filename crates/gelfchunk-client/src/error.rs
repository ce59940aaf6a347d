use std::io;

use gelfchunk_frame::FrameError;
use gelfchunk_transport::TransportError;

/// Errors returned by [`crate::Client`].
///
/// The first four variants come only from construction; the rest are
/// per-write and leave the client usable.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No packet transport was configured.
    #[error("cannot create new client without a connection")]
    MissingTransport,

    /// No destination address was configured.
    #[error("cannot create new client without a server address")]
    MissingServerAddr,

    /// The instance tag could not be drawn from the OS random source.
    #[error("creating unique ID for logging client: {0}")]
    Random(#[source] rand::Error),

    /// Encoding failed: invalid compression level, compressor failure or a
    /// message too large for the chunk limit.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The payload does not end with `\n`.
    #[error("missing newline terminating write")]
    MissingNewline,

    /// Sending a chunk failed. Earlier chunks of the message may be on the wire.
    #[error("writing to udp connection: {source} ({sent} of {total} chunks sent)")]
    Transport {
        sent: u8,
        total: u8,
        #[source]
        source: TransportError,
    },
}

impl ClientError {
    /// Whether this error can only come from [`crate::Client::new`].
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClientError::MissingTransport
                | ClientError::MissingServerAddr
                | ClientError::Random(_)
                | ClientError::Frame(FrameError::InvalidCompressionLevel(_))
        )
    }
}

impl From<ClientError> for io::Error {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            ClientError::MissingNewline => io::ErrorKind::InvalidInput,
            ClientError::Frame(_) => io::ErrorKind::InvalidData,
            ClientError::Transport { source, .. } => {
                source.io_kind().unwrap_or(io::ErrorKind::WriteZero)
            }
            ClientError::MissingTransport
            | ClientError::MissingServerAddr
            | ClientError::Random(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
