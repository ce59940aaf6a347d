use std::net::SocketAddr;

use bytes::BytesMut;
use gelfchunk_frame::{encode_chunk, Chunks};
use gelfchunk_transport::PacketTransport;
use tracing::trace;

use crate::error::{ClientError, Result};

/// Sends the chunks of one message, in order, to one destination.
pub struct Transmitter<'a, T: ?Sized> {
    transport: &'a T,
    addr: &'a SocketAddr,
}

impl<'a, T: PacketTransport + ?Sized> Transmitter<'a, T> {
    pub fn new(transport: &'a T, addr: &'a SocketAddr) -> Self {
        Self { transport, addr }
    }

    /// Frame each chunk into `packet` and send it, returning the number sent.
    ///
    /// Stops at the first failed send. Chunks already sent stay sent and
    /// nothing is retried.
    pub fn send_chunks(&self, chunks: Chunks<'_>, packet: &mut BytesMut) -> Result<u8> {
        let total = chunks.total();
        let id = chunks.id();
        let mut sent = 0u8;
        for chunk in chunks {
            packet.clear();
            encode_chunk(&chunk, packet);
            self.transport
                .send_to(&packet[..], self.addr)
                .map_err(|source| ClientError::Transport {
                    sent,
                    total,
                    source,
                })?;
            trace!(%id, index = chunk.header.index, total, size = packet.len(), "sent chunk");
            sent += 1;
        }
        packet.clear();
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use gelfchunk_frame::{
        decode_chunk, CompressionLevel, EncodingResource, MessageId, NO_COMPRESSION,
    };
    use gelfchunk_transport::TransportError;

    use super::*;

    /// Records datagrams and fails every send after `fail_after`.
    struct FlakyTransport {
        fail_after: usize,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl PacketTransport for FlakyTransport {
        fn send_to(
            &self,
            packet: &[u8],
            _addr: &SocketAddr,
        ) -> gelfchunk_transport::Result<usize> {
            let mut sent = self.sent.lock().unwrap();
            if sent.len() >= self.fail_after {
                return Err(TransportError::Io(std::io::Error::from(
                    std::io::ErrorKind::ConnectionRefused,
                )));
            }
            sent.push(packet.to_vec());
            Ok(packet.len())
        }
    }

    fn multi_chunk_resource() -> EncodingResource {
        let mut resource = EncodingResource::new(CompressionLevel::new(NO_COMPRESSION).unwrap());
        let mut payload = vec![b'z'; 4000];
        payload.push(b'\n');
        resource.encode(&payload).unwrap();
        resource
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:12201".parse().unwrap()
    }

    #[test]
    fn sends_every_chunk_in_order() {
        let transport = FlakyTransport {
            fail_after: usize::MAX,
            sent: Mutex::new(Vec::new()),
        };
        let addr = addr();
        let mut resource = multi_chunk_resource();
        let id = MessageId::new([1, 2, 3, 4], 1);
        let (chunks, packet) = resource.emit(id);
        let total = chunks.total();

        let sent = Transmitter::new(&transport, &addr)
            .send_chunks(chunks, packet)
            .unwrap();
        assert_eq!(sent, total);

        let datagrams = transport.sent.lock().unwrap();
        assert_eq!(datagrams.len(), total as usize);
        for (i, datagram) in datagrams.iter().enumerate() {
            let chunk = decode_chunk(datagram).unwrap();
            assert_eq!(chunk.header.index as usize, i);
            assert_eq!(chunk.header.id, id);
        }
    }

    #[test]
    fn aborts_remaining_chunks_on_failure() {
        let transport = FlakyTransport {
            fail_after: 1,
            sent: Mutex::new(Vec::new()),
        };
        let addr = addr();
        let mut resource = multi_chunk_resource();
        let (chunks, packet) = resource.emit(MessageId::new([0; 4], 9));
        let total = chunks.total();
        assert!(total > 2);

        let err = Transmitter::new(&transport, &addr)
            .send_chunks(chunks, packet)
            .unwrap_err();
        match err {
            ClientError::Transport { sent, total: t, .. } => {
                assert_eq!(sent, 1);
                assert_eq!(t, total);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        assert!(err_text(&transport).starts_with("writing to udp connection: "));
    }

    fn err_text(transport: &FlakyTransport) -> String {
        let addr = addr();
        let mut resource = multi_chunk_resource();
        let (chunks, packet) = resource.emit(MessageId::default());
        Transmitter::new(transport, &addr)
            .send_chunks(chunks, packet)
            .unwrap_err()
            .to_string()
    }
}
