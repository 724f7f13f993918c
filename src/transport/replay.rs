//! # Replay Byte Source
//!
//! Plays back a captured byte stream as if it came off the serial link.
//! Used for testing without hardware and for re-decoding captures.
//!
//! Bytes are handed out in fixed-size chunks so the pipeline sees the same
//! fragmentation it would on a real link. Acknowledgements written back are
//! recorded rather than sent anywhere.

use std::fs;
use std::io;
use std::path::Path;

use super::ByteSource;
use crate::error::GbPrinterError;

/// Default bytes returned per read
pub const DEFAULT_CHUNK_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct ReplaySource {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    acks: Vec<u8>,
}

impl ReplaySource {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            acks: Vec::new(),
        }
    }

    /// Load a raw capture file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GbPrinterError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            GbPrinterError::Transport(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::from_bytes(data))
    }

    /// Set the largest chunk one read returns. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Every acknowledgement byte written back so far
    pub fn acks(&self) -> &[u8] {
        &self.acks
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteSource for ReplaySource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk_size).min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn write_ack(&mut self, ack: &[u8]) -> io::Result<()> {
        self.acks.extend_from_slice(ack);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_chunks() {
        let mut source = ReplaySource::from_bytes((0..10).collect()).with_chunk_size(4);
        let mut buf = [0u8; 16];

        assert_eq!(source.read_chunk(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[0, 1, 2, 3]);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 4);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 2);
        assert!(source.is_exhausted());
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_small_buffer_limits_read() {
        let mut source = ReplaySource::from_bytes(vec![7; 100]);
        let mut buf = [0u8; 8];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 8);
        assert_eq!(source.remaining(), 92);
    }

    #[test]
    fn test_records_acks() {
        let mut source = ReplaySource::from_bytes(Vec::new());
        source.write_ack(&[0x81, 0x00, 0x00]).unwrap();
        assert_eq!(source.acks(), &[0x81, 0x00, 0x00]);
    }

    #[test]
    fn test_missing_file() {
        let err = ReplaySource::open("/nonexistent/capture.bin").unwrap_err();
        assert!(matches!(err, GbPrinterError::Transport(_)));
    }
}
