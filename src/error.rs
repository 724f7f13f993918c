//! # Error Types
//!
//! This module defines error types used throughout the gbprinter library.
//!
//! Errors are split by pipeline stage so callers can tell data-plane noise
//! (recoverable, the packet is dropped) from internal faults (the current
//! image is abandoned):
//!
//! | Stage | Type | Recoverable |
//! |-------|------|-------------|
//! | Packet decoding | [`DecodeError`] | yes, packet dropped |
//! | Image assembly | [`AssemblyError`] | yes, packet dropped |
//! | Rendering | [`RenderError`] | image aborted, service continues |
//! | Everything else | [`GbPrinterError`] | setup and I/O failures |

use thiserror::Error;

/// Errors raised while turning a raw frame into a [`Packet`](crate::protocol::Packet).
///
/// Every variant discards exactly one frame; the decoder resynchronizes on
/// the next sync marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The frame did not start with the sync marker
    #[error("Framing error: expected sync marker, found {found:02X?}")]
    Framing { found: Vec<u8> },

    /// The frame ended before the decoder reached a final state
    #[error("Truncated frame: ended while {state}")]
    Truncated { state: &'static str },

    /// Bytes remained after the checksum
    #[error("Frame has {extra} trailing bytes after the checksum")]
    TrailingBytes { extra: usize },

    /// Command byte is not one of the known packet types
    #[error("Unknown command byte 0x{0:02X}")]
    UnknownCommand(u8),

    /// Declared payload length exceeds anything the device sends
    #[error("Payload length {0} exceeds protocol maximum")]
    PayloadTooLarge(usize),

    /// Transmitted checksum does not match the computed sum
    #[error("Checksum mismatch: frame says 0x{expected:04X}, computed 0x{computed:04X}")]
    ChecksumMismatch { expected: u16, computed: u16 },

    /// Run-length payload was truncated or malformed
    #[error("Decompression error: {reason}")]
    Decompression { reason: String },
}

/// Errors raised by the [`ImageAssembler`](crate::raster::ImageAssembler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// Data payload is not a whole number of 16-byte tiles
    #[error("Malformed tile data: {len} bytes is not a multiple of 16")]
    MalformedTileData { len: usize },

    /// Data packet does not fit in what is left of the image buffer
    #[error("Image buffer full: {len} bytes do not fit in the {free} bytes left")]
    BufferFull { len: usize, free: usize },

    /// `get_image()` was called with no finished image pending
    #[error("No image available")]
    NoImageAvailable,
}

/// Errors raised by the palette renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Scale factor must be at least 1
    #[error("Invalid scale factor {0}: must be >= 1")]
    InvalidScale(u32),

    /// A raster pixel holds a shade outside 0..=3 (assembler invariant broken)
    #[error("Shade index {shade} out of range at ({x}, {y})")]
    ShadeIndexOutOfRange { x: usize, y: usize, shade: u8 },
}

/// Main error type for gbprinter operations
#[derive(Debug, Error)]
pub enum GbPrinterError {
    /// Transport-level errors (serial port, printer device)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration (palette, scale, paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Palette index or name not found
    #[error("Unknown palette '{0}'. Use --list-palettes to see available options.")]
    UnknownPalette(String),

    /// Image encoding or output error
    #[error("Image error: {0}")]
    Image(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
