//! # ESC/POS Command Builders
//!
//! The handful of ESC/POS commands needed to print a raster image.
//!
//! ## Command Summary
//!
//! | Command | Bytes | Purpose |
//! |---------|-------|---------|
//! | ESC @ | 1B 40 | initialize |
//! | GS v 0 | 1D 76 30 m xL xH yL yH d... | raster bit image |
//! | ESC d n | 1B 64 n | print and feed n lines |
//! | GS V 66 n | 1D 56 42 n | feed and partial cut |
//!
//! ## Bit Packing
//!
//! Raster data is row-major, one bit per dot, MSB = leftmost, 1 = black.

use crate::protocol::commands::u16_le;

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
pub const GS: u8 = 0x1D;

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets modes to power-on defaults.
///
/// ```
/// use gbprinter::printer::escpos;
///
/// assert_eq!(escpos::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Print and Feed n Lines (ESC d n)
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// # Feed and Partial Cut (GS V 66 n)
///
/// Feeds `n` dots past the cutter, then cuts. Printers without a cutter
/// ignore it.
#[inline]
pub fn cut_partial_feed(n: u8) -> Vec<u8> {
    vec![GS, b'V', 66, n]
}

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Parameters
///
/// - `m`: always 0 (normal density)
/// - `xL, xH`: width in bytes, little-endian
/// - `yL, yH`: height in dots, little-endian
/// - `d1...dk`: `width_bytes × height` bytes of image data
///
/// ## Example
///
/// ```
/// use gbprinter::printer::escpos;
///
/// let data = vec![0xAA; 48 * 10];
/// let cmd = escpos::raster(384, 10, &data);
/// assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 48, 0, 10, 0]);
/// assert_eq!(cmd.len(), 8 + 48 * 10);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_and_cut() {
        assert_eq!(feed_lines(4), vec![0x1B, 0x64, 0x04]);
        assert_eq!(cut_partial_feed(0), vec![0x1D, 0x56, 0x42, 0x00]);
    }

    #[test]
    fn test_raster_large_height() {
        let data = vec![0x00; 48 * 500];
        let cmd = raster(384, 500, &data);
        // 500 = 0x01F4
        assert_eq!(cmd[6], 0xF4);
        assert_eq!(cmd[7], 0x01);
    }

    #[test]
    fn test_raster_preserves_data() {
        let data: Vec<u8> = (0..48 * 20).map(|i| (i % 256) as u8).collect();
        let cmd = raster(384, 20, &data);
        assert_eq!(&cmd[8..], &data[..]);
    }
}
