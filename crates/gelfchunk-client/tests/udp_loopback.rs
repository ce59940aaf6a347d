use std::collections::BTreeMap;
use std::io::Read;
use std::net::UdpSocket;
use std::time::Duration;

use flate2::read::GzDecoder;
use gelfchunk_client::{Client, Config};
use gelfchunk_frame::{decode_chunk, MessageId, HEADER_SIZE, MAX_CHUNK_SIZE, NO_COMPRESSION};
use gelfchunk_transport::UdpTransport;

fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("receiver should bind");
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout should apply");
    socket
}

/// Read `count` datagrams and group chunk payloads by message id.
fn collect(socket: &UdpSocket, count: usize) -> BTreeMap<[u8; 8], BTreeMap<u8, Vec<u8>>> {
    let mut messages: BTreeMap<[u8; 8], BTreeMap<u8, Vec<u8>>> = BTreeMap::new();
    let mut buf = [0u8; 2048];
    for _ in 0..count {
        let (len, _) = socket.recv_from(&mut buf).expect("datagram should arrive");
        assert!(len <= HEADER_SIZE + MAX_CHUNK_SIZE);
        let chunk = decode_chunk(&buf[..len]).expect("datagram should be a gelf chunk");
        messages
            .entry(*chunk.header.id.as_bytes())
            .or_default()
            .insert(chunk.header.index, chunk.payload.to_vec());
    }
    messages
}

fn gunzip(parts: &BTreeMap<u8, Vec<u8>>) -> Vec<u8> {
    let compressed: Vec<u8> = parts.values().flatten().copied().collect();
    let mut out = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut out)
        .expect("reassembled message should gunzip");
    out
}

#[test]
fn single_chunk_message_over_udp() {
    let socket = receiver();
    let server = socket.local_addr().unwrap();
    let transport = UdpTransport::bind_for(server).unwrap();
    let client = Client::new(Config::new(server, transport)).unwrap();

    let line = br#"{"version":"1.1","host":"web-1","short_message":"started"}"#;
    let mut payload = line.to_vec();
    payload.push(b'\n');
    let receipt = client.dispatch(&payload).unwrap();
    assert_eq!(receipt.chunks, 1);
    assert_eq!(receipt.consumed, line.len());

    let messages = collect(&socket, 1);
    let (id, parts) = messages.iter().next().unwrap();
    assert_eq!(MessageId::from_bytes(*id), receipt.message_id.unwrap());
    assert_eq!(gunzip(parts), line);
}

#[test]
fn multi_chunk_message_over_udp() {
    let socket = receiver();
    let server = socket.local_addr().unwrap();
    let transport = UdpTransport::bind_for(server).unwrap();
    let config = Config::new(server, transport).with_compression_level(NO_COMPRESSION);
    let client = Client::new(config).unwrap();

    let body: Vec<u8> = (0..10_000u32).map(|i| b'0' + (i % 10) as u8).collect();
    let mut payload = body.clone();
    payload.push(b'\n');
    let receipt = client.dispatch(&payload).unwrap();
    assert!(receipt.chunks >= 8);

    let messages = collect(&socket, receipt.chunks as usize);
    assert_eq!(messages.len(), 1);
    let parts = messages.values().next().unwrap();
    assert_eq!(parts.len(), receipt.chunks as usize);
    assert_eq!(parts.keys().copied().max(), Some(receipt.chunks - 1));
    assert_eq!(gunzip(parts), body);
}
