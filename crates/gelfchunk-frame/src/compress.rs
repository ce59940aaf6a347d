//! Reusable gzip stream.
//!
//! `flate2::write::GzEncoder` cannot be rebound to a new sink, so the stream
//! is assembled from a resettable [`DeflateEncoder`] plus a [`Crc`], with the
//! RFC 1952 header and trailer written around the deflate body.

use std::io::{self, Write};

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};

use crate::error::{FrameError, Result};

/// Store blocks without compressing.
pub const NO_COMPRESSION: i32 = 0;
/// Fastest compressing level.
pub const BEST_SPEED: i32 = 1;
/// Smallest output.
pub const BEST_COMPRESSION: i32 = 9;
/// Library default (level 6).
pub const DEFAULT_COMPRESSION: i32 = -1;

const GZIP_ID: [u8; 2] = [0x1f, 0x8b];
const GZIP_CM_DEFLATE: u8 = 8;
const GZIP_OS_UNKNOWN: u8 = 0xff;

/// A validated compression effort level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    /// Validate a raw level: [`NO_COMPRESSION`], [`DEFAULT_COMPRESSION`] or
    /// anything in [`BEST_SPEED`]`..=`[`BEST_COMPRESSION`].
    pub fn new(level: i32) -> Result<Self> {
        match level {
            NO_COMPRESSION | DEFAULT_COMPRESSION => Ok(Self(level)),
            BEST_SPEED..=BEST_COMPRESSION => Ok(Self(level)),
            other => Err(FrameError::InvalidCompressionLevel(other)),
        }
    }

    /// The raw level as configured.
    pub fn get(self) -> i32 {
        self.0
    }

    fn compression(self) -> Compression {
        match self.0 {
            DEFAULT_COMPRESSION => Compression::default(),
            level => Compression::new(level.unsigned_abs()),
        }
    }

    fn xfl(self) -> u8 {
        match self.compression().level() {
            level if level >= 9 => 2,
            0 | 1 => 4,
            _ => 0,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(DEFAULT_COMPRESSION)
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = FrameError;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Fresh,
    Writing,
    Finished,
}

/// A gzip writer that owns its output accumulator and can be reset in place.
///
/// Lifecycle: [`write`](Self::write) any number of times, [`finish`](Self::finish)
/// once, read [`compressed`](Self::compressed), then [`reset`](Self::reset)
/// before the next message. Reset keeps the accumulator's capacity.
pub struct GzipStream {
    deflate: DeflateEncoder<Vec<u8>>,
    crc: Crc,
    level: CompressionLevel,
    state: StreamState,
}

impl GzipStream {
    pub fn new(level: CompressionLevel) -> Self {
        Self::with_capacity(level, 0)
    }

    /// Create a stream whose accumulator starts with `capacity` bytes reserved.
    pub fn with_capacity(level: CompressionLevel, capacity: usize) -> Self {
        Self {
            deflate: DeflateEncoder::new(Vec::with_capacity(capacity), level.compression()),
            crc: Crc::new(),
            level,
            state: StreamState::Fresh,
        }
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Compress `data` into the accumulator.
    pub fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.state {
            StreamState::Finished => {
                return Err(io::Error::other("gzip stream already finished"));
            }
            StreamState::Fresh => self.write_header(),
            StreamState::Writing => {}
        }
        self.deflate.write_all(data)?;
        self.crc.update(data);
        Ok(data.len())
    }

    /// Flush the final deflate block and append the gzip trailer.
    ///
    /// Idempotent once the stream is finished.
    pub fn finish(&mut self) -> io::Result<()> {
        match self.state {
            StreamState::Finished => return Ok(()),
            StreamState::Fresh => self.write_header(),
            StreamState::Writing => {}
        }
        self.deflate.try_finish()?;
        let sum = self.crc.sum().to_le_bytes();
        let amount = self.crc.amount().to_le_bytes();
        let out = self.deflate.get_mut();
        out.extend_from_slice(&sum);
        out.extend_from_slice(&amount);
        self.state = StreamState::Finished;
        Ok(())
    }

    /// Bytes produced so far. Complete gzip data only after [`finish`](Self::finish).
    pub fn compressed(&self) -> &[u8] {
        self.deflate.get_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    /// True when nothing has been written since construction or the last reset.
    pub fn is_fresh(&self) -> bool {
        self.state == StreamState::Fresh && self.deflate.get_ref().is_empty()
    }

    /// Drain the accumulator and rebind a fresh compressor onto it.
    pub fn reset(&mut self) -> io::Result<()> {
        // Swapping in an empty Vec does not allocate; any unfinished stream is
        // flushed into the old accumulator, which is cleared right after.
        let mut out = self.deflate.reset(Vec::new())?;
        out.clear();
        *self.deflate.get_mut() = out;
        self.crc.reset();
        self.state = StreamState::Fresh;
        Ok(())
    }

    fn write_header(&mut self) {
        let out = self.deflate.get_mut();
        out.extend_from_slice(&GZIP_ID);
        out.push(GZIP_CM_DEFLATE);
        out.push(0); // flags
        out.extend_from_slice(&[0, 0, 0, 0]); // mtime
        out.push(self.level.xfl());
        out.push(GZIP_OS_UNKNOWN);
        self.state = StreamState::Writing;
    }
}

impl std::fmt::Debug for GzipStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipStream")
            .field("level", &self.level)
            .field("state", &self.state)
            .field("buffered", &self.deflate.get_ref().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn level_validation() {
        for level in [-1, 0, 1, 5, 9] {
            assert_eq!(CompressionLevel::new(level).unwrap().get(), level);
        }
        for level in [-2, 10, 42, i32::MIN, i32::MAX] {
            assert!(matches!(
                CompressionLevel::new(level),
                Err(FrameError::InvalidCompressionLevel(l)) if l == level
            ));
        }
        assert_eq!(CompressionLevel::default().get(), DEFAULT_COMPRESSION);
        assert_eq!(
            CompressionLevel::try_from(12).unwrap_err().to_string(),
            "compression level of 12 is not a valid compression level"
        );
    }

    #[test]
    fn output_is_valid_gzip() {
        let mut stream = GzipStream::new(CompressionLevel::default());
        stream.write(b"hello ").unwrap();
        stream.write(b"graylog").unwrap();
        stream.finish().unwrap();

        assert!(stream.is_finished());
        assert_eq!(&stream.compressed()[..2], &GZIP_ID);
        assert_eq!(gunzip(stream.compressed()), b"hello graylog");
    }

    #[test]
    fn empty_stream_still_produces_gzip() {
        let mut stream = GzipStream::new(CompressionLevel::default());
        stream.finish().unwrap();
        assert!(gunzip(stream.compressed()).is_empty());
    }

    #[test]
    fn every_level_round_trips() {
        let text = b"level sweep level sweep level sweep".repeat(20);
        for level in [-1, 0, 1, 4, 9] {
            let mut stream = GzipStream::new(CompressionLevel::new(level).unwrap());
            stream.write(&text).unwrap();
            stream.finish().unwrap();
            assert_eq!(gunzip(stream.compressed()), text, "level {level}");
        }
    }

    #[test]
    fn reset_drains_and_rebinds() {
        let mut stream = GzipStream::with_capacity(CompressionLevel::default(), 256);
        stream.write(b"first message").unwrap();
        stream.finish().unwrap();
        let capacity = stream.deflate.get_ref().capacity();

        stream.reset().unwrap();
        assert!(stream.is_fresh());
        assert_eq!(stream.deflate.get_ref().capacity(), capacity);

        stream.write(b"second").unwrap();
        stream.finish().unwrap();
        assert_eq!(gunzip(stream.compressed()), b"second");
    }

    #[test]
    fn reset_mid_stream_discards_partial_output() {
        let mut stream = GzipStream::new(CompressionLevel::new(BEST_SPEED).unwrap());
        stream.write(b"abandoned").unwrap();
        stream.reset().unwrap();
        assert!(stream.is_fresh());

        stream.write(b"kept").unwrap();
        stream.finish().unwrap();
        assert_eq!(gunzip(stream.compressed()), b"kept");
    }

    #[test]
    fn write_after_finish_is_rejected() {
        let mut stream = GzipStream::new(CompressionLevel::default());
        stream.finish().unwrap();
        stream.finish().unwrap();
        assert!(stream.write(b"late").is_err());
    }
}
