use std::net::SocketAddr;

/// Errors that can occur in packet transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind a local socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to resolve a `host:port` string to a socket address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },

    /// Failed to send a datagram.
    #[error("failed to send to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The socket accepted only part of a datagram.
    #[error("short datagram write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// Any other I/O error on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error kind, when there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Bind { source, .. }
            | TransportError::Resolve { source, .. }
            | TransportError::Send { source, .. }
            | TransportError::Io(source) => Some(source.kind()),
            TransportError::ShortWrite { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
