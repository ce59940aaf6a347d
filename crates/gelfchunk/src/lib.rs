//! GELF chunked UDP log shipping.
//!
//! gelfchunk turns newline-terminated log lines into gzip-compressed,
//! chunked GELF datagrams and sends them to a Graylog-compatible collector.
//! Encoders and packet buffers are pooled so concurrent writers do not
//! allocate per message.
//!
//! # Crate Structure
//!
//! - [`transport`]: packet transport abstraction and the UDP socket
//! - [`frame`]: chunk wire format, gzip stream, encoding resources and pool
//! - [`client`]: the concurrent writer that ties them together
//! - [`workers`]: a fixed pool of buffered writer threads over one sink

/// Re-export transport types.
pub mod transport {
    pub use gelfchunk_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gelfchunk_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use gelfchunk_client::*;
}

pub mod workers;
