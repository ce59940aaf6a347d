use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use crate::error::{Result, TransportError};

/// A connectionless, address-addressable datagram sink.
///
/// Implementations must be usable from many threads at once through `&self`;
/// every call sends exactly one datagram. Deadlines, if any, are the
/// implementation's business (see [`crate::UdpTransport::set_write_timeout`]).
pub trait PacketTransport: Send + Sync {
    /// Send one datagram to `addr`, returning the number of bytes written.
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize>;
}

impl PacketTransport for UdpSocket {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize> {
        let written = UdpSocket::send_to(self, packet, addr).map_err(|source| {
            TransportError::Send {
                addr: *addr,
                source,
            }
        })?;
        if written != packet.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: packet.len(),
            });
        }
        Ok(written)
    }
}

impl<T: PacketTransport + ?Sized> PacketTransport for &T {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize> {
        (**self).send_to(packet, addr)
    }
}

impl<T: PacketTransport + ?Sized> PacketTransport for Arc<T> {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize> {
        (**self).send_to(packet, addr)
    }
}

impl<T: PacketTransport + ?Sized> PacketTransport for Box<T> {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize> {
        (**self).send_to(packet, addr)
    }
}
