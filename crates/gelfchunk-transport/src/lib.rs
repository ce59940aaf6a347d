//! Packet transport abstraction for GELF datagrams.
//!
//! Provides the one operation the chunked encoder needs from a network:
//! "send these bytes to that address". The [`PacketTransport`] trait is
//! implemented for [`std::net::UdpSocket`] and for [`UdpTransport`], a thin
//! wrapper that knows how to bind itself for a given destination.
//!
//! This is the lowest layer of gelfchunk. It knows nothing about chunking,
//! compression or message IDs.

pub mod error;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use traits::PacketTransport;
pub use udp::{resolve, UdpTransport};
