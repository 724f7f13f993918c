//! # Packet Decoding
//!
//! Turns one raw frame into a validated [`Packet`].
//!
//! The decoder is a byte-driven state machine:
//!
//! ```text
//! AwaitSync ──► AwaitHeader ──► AwaitPayload ──► AwaitChecksum ──► Validated
//!     ▲              │                │                 │
//!     └──────────────┴────────────────┴─────────────────┴──── Rejected
//! ```
//!
//! - **AwaitSync**: scan for `0x88 0x33`
//! - **AwaitHeader**: command byte, compression flag
//! - **AwaitPayload**: u16 LE length, then that many payload bytes
//! - **AwaitChecksum**: u16 LE checksum, compared against the running sum
//!
//! Any rejection drops the frame and returns the machine to `AwaitSync`.
//! Decompression only runs after the checksum has validated.

use tracing::trace;

use super::commands::{
    CHECKSUM_LEN, Command, HEADER_LEN, MAX_PAYLOAD_LEN, SYNC, acknowledgement, u16_le,
};
use super::compression;
use crate::error::DecodeError;

/// A validated protocol packet.
///
/// `payload` is always the decompressed payload. `checksum` is the value
/// carried on the wire, which covers the bytes as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub command: Command,
    pub compressed: bool,
    pub payload: Vec<u8>,
    pub checksum: u16,
}

impl Packet {
    /// Encode a packet into wire bytes, sync marker through checksum.
    ///
    /// With `compress` set the payload is run-length encoded first and the
    /// compression flag byte is 1.
    ///
    /// ## Example
    ///
    /// ```
    /// use gbprinter::protocol::{Command, Packet};
    ///
    /// let frame = Packet::encode(Command::Initialize, &[], false);
    /// assert_eq!(frame, vec![0x88, 0x33, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00]);
    /// ```
    pub fn encode(command: Command, payload: &[u8], compress: bool) -> Vec<u8> {
        let wire_payload = if compress {
            compression::compress(payload)
        } else {
            payload.to_vec()
        };

        let mut frame = Vec::with_capacity(HEADER_LEN + wire_payload.len() + CHECKSUM_LEN);
        frame.extend_from_slice(&SYNC);
        frame.push(command.to_byte());
        frame.push(compress as u8);
        frame.extend_from_slice(&u16_le(wire_payload.len() as u16));
        frame.extend_from_slice(&wire_payload);

        let sum = checksum(&frame[SYNC.len()..]);
        frame.extend_from_slice(&u16_le(sum));
        frame
    }
}

/// Sum every byte modulo 65536.
///
/// Applied to command, compression flag, both length bytes and the wire
/// payload, this gives the packet checksum.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(b as u16))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitSync { primed: bool },
    AwaitHeader,
    AwaitPayload,
    AwaitChecksum,
}

impl State {
    fn describe(self) -> &'static str {
        match self {
            State::AwaitSync { .. } => "awaiting sync",
            State::AwaitHeader => "awaiting header",
            State::AwaitPayload => "awaiting payload",
            State::AwaitChecksum => "awaiting checksum",
        }
    }
}

/// Byte-driven packet decoder.
///
/// Use [`decode`](Self::decode) on frames handed out by the
/// [`FrameAccumulator`](super::FrameAccumulator), or [`push`](Self::push)
/// bytes directly for an unframed stream.
#[derive(Debug)]
pub struct PacketDecoder {
    state: State,
    command: Option<Command>,
    compressed: bool,
    header: Vec<u8>,
    payload_len: usize,
    payload: Vec<u8>,
    received_checksum: Vec<u8>,
    sum: u16,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            state: State::AwaitSync { primed: false },
            command: None,
            compressed: false,
            header: Vec::with_capacity(4),
            payload_len: 0,
            payload: Vec::new(),
            received_checksum: Vec::with_capacity(CHECKSUM_LEN),
            sum: 0,
        }
    }

    /// Return to `AwaitSync`, forgetting any partially decoded packet.
    pub fn reset(&mut self) {
        self.state = State::AwaitSync { primed: false };
        self.command = None;
        self.compressed = false;
        self.header.clear();
        self.payload_len = 0;
        self.payload.clear();
        self.received_checksum.clear();
        self.sum = 0;
    }

    /// True when the decoder is between packets.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::AwaitSync { primed: false })
    }

    /// Decode exactly one frame.
    ///
    /// The frame must start with the sync marker and end with the checksum.
    /// On any error the decoder is reset and the frame is dropped.
    pub fn decode(&mut self, frame: &[u8]) -> Result<Packet, DecodeError> {
        self.reset();

        if !frame.starts_with(&SYNC) {
            return Err(DecodeError::Framing {
                found: frame.iter().take(SYNC.len()).copied().collect(),
            });
        }

        for (i, &byte) in frame.iter().enumerate() {
            if let Some(result) = self.push(byte) {
                let extra = frame.len() - i - 1;
                if result.is_ok() && extra > 0 {
                    return Err(DecodeError::TrailingBytes { extra });
                }
                return result;
            }
        }

        let state = self.state.describe();
        self.reset();
        Err(DecodeError::Truncated { state })
    }

    /// Feed one byte. Returns `Some` when a packet completes or is rejected.
    pub fn push(&mut self, byte: u8) -> Option<Result<Packet, DecodeError>> {
        match self.state {
            State::AwaitSync { primed } => {
                self.state = if primed && byte == SYNC[1] {
                    State::AwaitHeader
                } else {
                    State::AwaitSync {
                        primed: byte == SYNC[0],
                    }
                };
                None
            }
            State::AwaitHeader => {
                self.sum = self.sum.wrapping_add(byte as u16);
                self.header.push(byte);
                if self.header.len() < 2 {
                    return None;
                }

                let command_byte = self.header[0];
                let Some(command) = Command::from_byte(command_byte) else {
                    return Some(self.reject(DecodeError::UnknownCommand(command_byte)));
                };
                self.command = Some(command);
                self.compressed = self.header[1] & 0x01 != 0;
                self.state = State::AwaitPayload;
                None
            }
            State::AwaitPayload => {
                self.sum = self.sum.wrapping_add(byte as u16);
                if self.header.len() < 4 {
                    self.header.push(byte);
                    if self.header.len() == 4 {
                        self.payload_len =
                            u16::from_le_bytes([self.header[2], self.header[3]]) as usize;
                        if self.payload_len > MAX_PAYLOAD_LEN {
                            let len = self.payload_len;
                            return Some(self.reject(DecodeError::PayloadTooLarge(len)));
                        }
                        self.payload.reserve(self.payload_len);
                        if self.payload_len == 0 {
                            self.state = State::AwaitChecksum;
                        }
                    }
                    return None;
                }

                self.payload.push(byte);
                if self.payload.len() == self.payload_len {
                    self.state = State::AwaitChecksum;
                }
                None
            }
            State::AwaitChecksum => {
                self.received_checksum.push(byte);
                if self.received_checksum.len() < CHECKSUM_LEN {
                    return None;
                }
                Some(self.finish())
            }
        }
    }

    /// Acknowledgement bytes for a validated packet.
    pub fn acknowledgement(&self, status: u8) -> [u8; 3] {
        acknowledgement(status)
    }

    fn finish(&mut self) -> Result<Packet, DecodeError> {
        let expected = u16::from_le_bytes([self.received_checksum[0], self.received_checksum[1]]);
        if expected != self.sum {
            let computed = self.sum;
            return self.reject(DecodeError::ChecksumMismatch { expected, computed });
        }

        let Some(command) = self.command else {
            return self.reject(DecodeError::Truncated {
                state: State::AwaitHeader.describe(),
            });
        };

        let payload = std::mem::take(&mut self.payload);
        let payload = if self.compressed {
            match compression::decompress(&payload) {
                Ok(expanded) => expanded,
                Err(e) => return self.reject(e),
            }
        } else {
            payload
        };

        let packet = Packet {
            command,
            compressed: self.compressed,
            payload,
            checksum: expected,
        };
        trace!(
            command = command.name(),
            compressed = packet.compressed,
            len = packet.payload.len(),
            "packet validated"
        );
        self.reset();
        Ok(packet)
    }

    fn reject(&mut self, error: DecodeError) -> Result<Packet, DecodeError> {
        self.reset();
        Err(error)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_initialize() {
        let frame = Packet::encode(Command::Initialize, &[], false);
        assert_eq!(frame, vec![0x88, 0x33, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_checksum_covers_header_and_payload() {
        let frame = Packet::encode(Command::Data, &[0x10, 0x20], false);
        // 0x04 + 0x00 + 0x02 + 0x00 + 0x10 + 0x20
        assert_eq!(&frame[frame.len() - 2..], &[0x36, 0x00]);
    }

    #[test]
    fn test_checksum_wraps() {
        let payload = vec![0xFF; 300];
        assert_eq!(checksum(&payload), ((0xFF * 300) % 65536) as u16);
        let big = vec![0xFF; 1000];
        assert_eq!(checksum(&big), ((0xFFu32 * 1000) % 65536) as u16);
    }

    #[test]
    fn test_decode_data_packet() {
        let payload: Vec<u8> = (0..32).collect();
        let frame = Packet::encode(Command::Data, &payload, false);

        let packet = PacketDecoder::new().decode(&frame).unwrap();
        assert_eq!(packet.command, Command::Data);
        assert!(!packet.compressed);
        assert_eq!(packet.payload, payload);
    }

    #[test]
    fn test_decode_compressed_packet() {
        let payload = vec![0u8; 640];
        let frame = Packet::encode(Command::Data, &payload, true);
        assert!(frame.len() < 20);

        let packet = PacketDecoder::new().decode(&frame).unwrap();
        assert!(packet.compressed);
        assert_eq!(packet.payload, payload);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut frame = Packet::encode(Command::Data, &[1, 2, 3, 4], false);
        frame[7] ^= 0x01;

        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert!(matches!(err, DecodeError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_missing_sync() {
        let mut frame = Packet::encode(Command::Print, &[1, 0x13, 0xE4, 0x40], false);
        frame[0] = 0x00;
        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert_eq!(err, DecodeError::Framing { found: vec![0x00, 0x33] });
    }

    #[test]
    fn test_unknown_command() {
        let mut frame = Packet::encode(Command::Break, &[], false);
        frame[2] = 0x09;
        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert_eq!(err, DecodeError::UnknownCommand(0x09));
    }

    #[test]
    fn test_oversized_length_reported_before_payload() {
        let mut frame = vec![0x88, 0x33, 0x04, 0x00, 0x01, 0x30];
        frame.extend([0u8; 16]);
        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert_eq!(err, DecodeError::PayloadTooLarge(0x3001));
    }

    #[test]
    fn test_truncated_frame() {
        let frame = Packet::encode(Command::Data, &[0u8; 16], false);
        let err = PacketDecoder::new().decode(&frame[..10]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                state: "awaiting payload"
            }
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut frame = Packet::encode(Command::Break, &[], false);
        frame.extend([0x00, 0x00]);
        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert_eq!(err, DecodeError::TrailingBytes { extra: 2 });
    }

    #[test]
    fn test_bad_compression_rejected_after_checksum() {
        // Compressed flag set, payload promises 5 literal bytes but has 1
        let mut frame = vec![0x88, 0x33, 0x04, 0x01, 0x02, 0x00, 0x04, 0xAA];
        let sum = checksum(&frame[2..]);
        frame.extend(u16_le(sum));

        let err = PacketDecoder::new().decode(&frame).unwrap_err();
        assert!(matches!(err, DecodeError::Decompression { .. }));
    }

    #[test]
    fn test_push_resyncs_after_noise() {
        let mut decoder = PacketDecoder::new();
        let mut stream = vec![0x00, 0x88, 0x88, 0x12];
        stream.extend(Packet::encode(Command::Break, &[], false));

        let results: Vec<_> = stream.iter().filter_map(|&b| decoder.push(b)).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().command, Command::Break);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decoder_reusable_after_error() {
        let mut decoder = PacketDecoder::new();
        let mut bad = Packet::encode(Command::Data, &[9; 16], false);
        bad[6] ^= 0xFF;
        assert!(decoder.decode(&bad).is_err());

        let good = Packet::encode(Command::Data, &[9; 16], false);
        assert_eq!(decoder.decode(&good).unwrap().payload, vec![9; 16]);
    }
}
