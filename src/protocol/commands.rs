//! # Game Boy Printer Protocol Commands
//!
//! Constants and command types for the link-cable printer protocol spoken by
//! the Game Boy and relayed to us by the printer emulator.
//!
//! ## Frame Structure
//!
//! Every packet on the wire has the same shape:
//!
//! ```text
//! ┌──────┬──────┬─────────┬──────────┬───────────────┬──────────┐
//! │ 0x88 │ 0x33 │ command │ compress │ length (u16)  │ payload  │ checksum (u16)
//! └──────┴──────┴─────────┴──────────┴───────────────┴──────────┘
//!   sync marker    1 byte     1 byte    little-endian   N bytes    little-endian
//! ```
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x0280 is sent as bytes `[0x80, 0x02]`
//!
//! ## Acknowledgement
//!
//! After each valid packet the printer answers with a keep-alive byte and a
//! status byte. We emit `[0x81, 0x00, status]`.

// ============================================================================
// FRAMING CONSTANTS
// ============================================================================

/// Two-byte sync marker that opens every frame
pub const SYNC: [u8; 2] = [0x88, 0x33];

/// Bytes before the payload: sync (2) + command (1) + compression (1) + length (2)
pub const HEADER_LEN: usize = 6;

/// Bytes after the payload: checksum (2)
pub const CHECKSUM_LEN: usize = 2;

/// Largest payload length we accept in a header.
///
/// A Data packet carries at most 640 bytes of tiles; compressed payloads can
/// exceed that slightly in the worst case. Anything beyond this bound is a
/// corrupted length field.
pub const MAX_PAYLOAD_LEN: usize = 0x2000;

/// Keep-alive byte sent back by a connected printer
pub const ACK_ALIVE: u8 = 0x81;

// ============================================================================
// STATUS BITS
// ============================================================================

/// Status bit 0: last packet had a checksum error
pub const STATUS_CHECKSUM_ERROR: u8 = 0x01;

/// Status bit 1: printer is busy printing
pub const STATUS_PRINTING: u8 = 0x02;

/// Status bit 2: image buffer is full
pub const STATUS_IMAGE_FULL: u8 = 0x04;

/// Status bit 3: data received but not yet printed
pub const STATUS_UNPROCESSED: u8 = 0x08;

// ============================================================================
// COMMANDS
// ============================================================================

/// Packet command type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Start a new image, discarding anything in progress
    Initialize,
    /// Finish the image and print it
    Print,
    /// Tile data for the image
    Data,
    /// Break / status inquiry
    Break,
}

// Wire format values
const CMD_INITIALIZE: u8 = 0x01;
const CMD_PRINT: u8 = 0x02;
const CMD_DATA: u8 = 0x04;
const CMD_BREAK: u8 = 0x0F;

impl Command {
    /// Parse a command from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_INITIALIZE => Some(Command::Initialize),
            CMD_PRINT => Some(Command::Print),
            CMD_DATA => Some(Command::Data),
            CMD_BREAK => Some(Command::Break),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Initialize => CMD_INITIALIZE,
            Command::Print => CMD_PRINT,
            Command::Data => CMD_DATA,
            Command::Break => CMD_BREAK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Initialize => "initialize",
            Command::Print => "print",
            Command::Data => "data",
            Command::Break => "break",
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build the acknowledgement sequence written back after a valid packet.
///
/// ## Example
///
/// ```
/// use gbprinter::protocol::commands::{acknowledgement, STATUS_UNPROCESSED};
///
/// assert_eq!(acknowledgement(0), [0x81, 0x00, 0x00]);
/// assert_eq!(acknowledgement(STATUS_UNPROCESSED), [0x81, 0x00, 0x08]);
/// ```
#[inline]
pub const fn acknowledgement(status: u8) -> [u8; 3] {
    [ACK_ALIVE, 0x00, status]
}

/// Encode a u16 value as little-endian bytes [low, high]
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::Initialize.to_byte(), 0x01);
        assert_eq!(Command::Print.to_byte(), 0x02);
        assert_eq!(Command::Data.to_byte(), 0x04);
        assert_eq!(Command::Break.to_byte(), 0x0F);
    }

    #[test]
    fn test_command_parse() {
        for cmd in [
            Command::Initialize,
            Command::Print,
            Command::Data,
            Command::Break,
        ] {
            assert_eq!(Command::from_byte(cmd.to_byte()), Some(cmd));
        }
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::from_byte(0x00).is_none());
        assert!(Command::from_byte(0x03).is_none());
        assert!(Command::from_byte(0x08).is_none());
        assert!(Command::from_byte(0xFF).is_none());
    }

    #[test]
    fn test_acknowledgement_layout() {
        let ack = acknowledgement(STATUS_UNPROCESSED | STATUS_PRINTING);
        assert_eq!(ack[0], ACK_ALIVE);
        assert_eq!(ack[1], 0x00);
        assert_eq!(ack[2], 0x0A);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x0280), [0x80, 0x02]); // one full band of tiles
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
    }
}
