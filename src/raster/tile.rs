//! # 2bpp Tile Codec
//!
//! The printer receives images as 8×8 tiles in the console's native 2 bits
//! per pixel format. Each tile is 16 bytes, two per pixel row:
//!
//! ```text
//! byte 2r   : low bit-plane of row r   (bit 7 = leftmost pixel)
//! byte 2r+1 : high bit-plane of row r
//!
//! shade(x) = (hi >> (7 - x) & 1) << 1 | (lo >> (7 - x) & 1)
//! ```
//!
//! ## Example
//!
//! ```text
//! lo = 0b1010_0000, hi = 0b1100_0000
//! shades: 3 2 1 0 0 0 0 0
//! ```

/// Bytes per encoded tile
pub const TILE_BYTES: usize = 16;

/// Tile edge length in pixels
pub const TILE_SIZE: usize = 8;

/// One decoded tile: `tile[row][col]` is a shade index 0..=3
pub type TilePixels = [[u8; TILE_SIZE]; TILE_SIZE];

/// Decode one 16-byte tile into shade indices.
pub fn decode_tile(tile: &[u8]) -> TilePixels {
    debug_assert!(
        tile.len() == TILE_BYTES,
        "Tile must be exactly {} bytes, got {}",
        TILE_BYTES,
        tile.len()
    );

    let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (row, planes) in pixels.iter_mut().zip(tile.chunks_exact(2)) {
        let (lo, hi) = (planes[0], planes[1]);
        for (x, shade) in row.iter_mut().enumerate() {
            let bit = 7 - x;
            *shade = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
        }
    }
    pixels
}

/// Encode shade indices back into the 16-byte tile format.
///
/// Only the low two bits of each shade are used.
pub fn encode_tile(pixels: &TilePixels) -> [u8; TILE_BYTES] {
    let mut tile = [0u8; TILE_BYTES];
    for (row, shades) in pixels.iter().enumerate() {
        for (x, &shade) in shades.iter().enumerate() {
            let bit = 7 - x;
            tile[row * 2] |= (shade & 1) << bit;
            tile[row * 2 + 1] |= ((shade >> 1) & 1) << bit;
        }
    }
    tile
}
