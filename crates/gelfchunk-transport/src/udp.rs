use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::PacketTransport;

/// UDP datagram transport.
///
/// Wraps an unconnected [`UdpSocket`] so one socket can address any
/// destination per call. The socket is shared read-only between writers;
/// the kernel serializes concurrent `send_to` calls per datagram.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind a UDP socket to an explicit local address.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        debug!(local = ?socket.local_addr().ok(), "bound udp transport");
        Ok(Self { socket })
    }

    /// Bind an ephemeral local port able to reach `dest`.
    ///
    /// Uses the unspecified address of the destination's address family.
    pub fn bind_for(dest: SocketAddr) -> Result<Self> {
        let ip = match dest.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        Self::bind(SocketAddr::new(ip, 0))
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Bound how long a single datagram send may block.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Borrow the underlying socket.
    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }
}

impl PacketTransport for UdpTransport {
    fn send_to(&self, packet: &[u8], addr: &SocketAddr) -> Result<usize> {
        PacketTransport::send_to(&self.socket, packet, addr)
    }
}

/// Resolve a `host:port` string to the first socket address it names.
pub fn resolve(host: &str) -> Result<SocketAddr> {
    let mut addrs = host
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            source,
        })?;
    addrs.next().ok_or_else(|| TransportError::Resolve {
        host: host.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses returned for host",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_for_matches_destination_family() {
        let dest: SocketAddr = "127.0.0.1:12201".parse().unwrap();
        let transport = UdpTransport::bind_for(dest).unwrap();
        let local = transport.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
        assert_eq!(transport.transport_name(), "udp");
    }

    #[test]
    fn send_reaches_loopback_receiver() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let dest = receiver.local_addr().unwrap();
        let transport = UdpTransport::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        transport
            .set_write_timeout(Some(Duration::from_secs(1)))
            .unwrap();

        transport.send_to(b"hello gelf", &dest).unwrap();

        let mut buf = [0u8; 32];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello gelf");
    }

    #[test]
    fn bind_conflict_reports_address() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let err = UdpTransport::bind(addr).unwrap_err();
        match err {
            TransportError::Bind { addr: reported, .. } => assert_eq!(reported, addr),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_numeric_host() {
        let addr = resolve("127.0.0.1:12201").unwrap();
        assert_eq!(addr, "127.0.0.1:12201".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn resolve_rejects_missing_port() {
        let err = resolve("127.0.0.1").unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }
}
