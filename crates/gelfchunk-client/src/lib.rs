//! Concurrent GELF-over-UDP log writer.
//!
//! This is the "just write lines" layer. Build a [`Client`] from a
//! destination address and a packet transport, then hand it newline-terminated
//! payloads from any number of threads:
//!
//! ```no_run
//! use gelfchunk_client::{Client, Config};
//! use gelfchunk_transport::UdpTransport;
//!
//! let server = "127.0.0.1:12201".parse().unwrap();
//! let transport = UdpTransport::bind_for(server).unwrap();
//! let client = Client::new(Config::new(server, transport)).unwrap();
//! client.send(b"{\"short_message\":\"hello\"}\n").unwrap();
//! ```

pub mod client;
pub mod error;
pub mod transmit;

pub use client::{Client, Config, Receipt};
pub use error::{ClientError, Result};
pub use gelfchunk_frame::PoolStrategy;
pub use transmit::Transmitter;
