//! # Raster Image
//!
//! A [`RasterImage`] is the printer's view of an image: a 160-pixel wide
//! grid of 2-bit shade indices that grows downward in 16-row bands.
//!
//! ```text
//!  ◄──────────── 20 tiles = 160 px ────────────►
//! ┌───┬───┬───┬───┬───┬───┬───┬───┬─────┬───┬───┐ ▲
//! │ 0 │ 1 │ 2 │ 3 │ 4 │ 5 │ 6 │ 7 │ ... │18 │19 │ │ band 0
//! ├───┼───┼───┼───┼───┼───┼───┼───┼─────┼───┼───┤ │ (16 px)
//! │20 │21 │22 │23 │24 │25 │26 │27 │ ... │38 │39 │ │
//! ├───┴───┴───┴───┴───┴───┴───┴───┴─────┴───┴───┤ ▼
//! │                  band 1 ...                  │
//! ```

use super::tile::{TILE_BYTES, TILE_SIZE, TilePixels, decode_tile, encode_tile};

/// Image width in pixels
pub const IMAGE_WIDTH: usize = 160;

/// Tiles per tile-row
pub const TILES_PER_ROW: usize = IMAGE_WIDTH / TILE_SIZE;

/// Pixel rows added per band (two tile-rows)
pub const BAND_HEIGHT: usize = 2 * TILE_SIZE;

/// Tiles in one full band
pub const TILES_PER_BAND: usize = 2 * TILES_PER_ROW;

/// Encoded bytes in one full band (the largest Data payload the console sends)
pub const BAND_BYTES: usize = TILES_PER_BAND * TILE_BYTES;

/// Print parameters carried by the Print packet.
///
/// ## Payload Layout
///
/// | Byte | Meaning |
/// |------|---------|
/// | 0 | number of sheets (0 = feed only) |
/// | 1 | margins: high nibble before, low nibble after |
/// | 2 | console palette byte (usually `0xE4`) |
/// | 3 | exposure / darkness, `0x00`–`0x7F` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintParams {
    pub sheets: u8,
    pub margin_before: u8,
    pub margin_after: u8,
    pub palette: u8,
    pub exposure: u8,
}

impl PrintParams {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let bytes: [u8; 4] = payload.get(..4)?.try_into().ok()?;
        let [sheets, margins, palette, exposure] = bytes;
        Some(Self {
            sheets,
            margin_before: margins >> 4,
            margin_after: margins & 0x0F,
            palette,
            exposure: exposure & 0x7F,
        })
    }
}

/// Grid of shade indices, row-major, [`IMAGE_WIDTH`] pixels wide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RasterImage {
    height: usize,
    pixels: Vec<u8>,
    print_params: Option<PrintParams>,
}

impl RasterImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an image from raw shade indices.
    ///
    /// Returns `None` unless `pixels.len() == IMAGE_WIDTH * height`. Shade
    /// values are not checked here; the renderer rejects anything above 3.
    pub fn from_pixels(height: usize, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == IMAGE_WIDTH * height).then_some(Self {
            height,
            pixels,
            print_params: None,
        })
    }

    pub fn width(&self) -> usize {
        IMAGE_WIDTH
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Shade at (x, y). Panics when out of bounds.
    pub fn shade(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * IMAGE_WIDTH + x]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * IMAGE_WIDTH..(y + 1) * IMAGE_WIDTH]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn print_params(&self) -> Option<PrintParams> {
        self.print_params
    }

    pub(crate) fn set_print_params(&mut self, params: Option<PrintParams>) {
        self.print_params = params;
    }

    /// Append whole tiles as new bands.
    ///
    /// `payload.len()` must be a multiple of [`TILE_BYTES`]; the assembler
    /// checks this before calling. Tiles missing from the last band stay
    /// shade 0.
    pub(crate) fn append_tiles(&mut self, payload: &[u8]) {
        debug_assert!(payload.len() % TILE_BYTES == 0);

        let tiles = payload.len() / TILE_BYTES;
        let bands = tiles.div_ceil(TILES_PER_BAND);
        let top = self.height;

        self.height += bands * BAND_HEIGHT;
        self.pixels.resize(self.height * IMAGE_WIDTH, 0);

        for (index, tile) in payload.chunks_exact(TILE_BYTES).enumerate() {
            let band = index / TILES_PER_BAND;
            let within = index % TILES_PER_BAND;
            let y0 = top + band * BAND_HEIGHT + (within / TILES_PER_ROW) * TILE_SIZE;
            let x0 = (within % TILES_PER_ROW) * TILE_SIZE;
            self.blit(x0, y0, &decode_tile(tile));
        }
    }

    /// Encode the image back into Data payloads, one full band each.
    ///
    /// The height must be a multiple of [`BAND_HEIGHT`], which holds for
    /// every image built by the assembler.
    pub fn to_bands(&self) -> Vec<Vec<u8>> {
        (0..self.height / BAND_HEIGHT)
            .map(|band| {
                let mut payload = Vec::with_capacity(BAND_BYTES);
                for index in 0..TILES_PER_BAND {
                    let y0 = band * BAND_HEIGHT + (index / TILES_PER_ROW) * TILE_SIZE;
                    let x0 = (index % TILES_PER_ROW) * TILE_SIZE;
                    payload.extend_from_slice(&encode_tile(&self.tile_at(x0, y0)));
                }
                payload
            })
            .collect()
    }

    fn blit(&mut self, x0: usize, y0: usize, tile: &TilePixels) {
        for (dy, shades) in tile.iter().enumerate() {
            let start = (y0 + dy) * IMAGE_WIDTH + x0;
            self.pixels[start..start + TILE_SIZE].copy_from_slice(shades);
        }
    }

    fn tile_at(&self, x0: usize, y0: usize) -> TilePixels {
        let mut tile = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (dy, shades) in tile.iter_mut().enumerate() {
            let start = (y0 + dy) * IMAGE_WIDTH + x0;
            shades.copy_from_slice(&self.pixels[start..start + TILE_SIZE]);
        }
        tile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_constants() {
        assert_eq!(TILES_PER_ROW, 20);
        assert_eq!(TILES_PER_BAND, 40);
        assert_eq!(BAND_BYTES, 640);
    }

    #[test]
    fn test_single_tile_fills_one_band() {
        let mut image = RasterImage::new();
        image.append_tiles(&[0xFF; 16]);

        assert_eq!(image.height(), 16);
        assert_eq!(image.shade(0, 0), 3);
        assert_eq!(image.shade(7, 7), 3);
        // Rest of the band is blank
        assert_eq!(image.shade(8, 0), 0);
        assert_eq!(image.shade(0, 8), 0);
    }

    #[test]
    fn test_tile_21_lands_on_second_tile_row() {
        let mut payload = vec![0u8; 22 * 16];
        payload[21 * 16..].fill(0xFF);

        let mut image = RasterImage::new();
        image.append_tiles(&payload);
        assert_eq!(image.shade(8, 8), 3);
        assert_eq!(image.shade(15, 15), 3);
        assert_eq!(image.shade(16, 8), 0);
    }

    #[test]
    fn test_bands_stack_downward() {
        let mut image = RasterImage::new();
        image.append_tiles(&[0x00; BAND_BYTES]);
        image.append_tiles(&[0xFF; BAND_BYTES]);

        assert_eq!(image.height(), 32);
        assert!(image.row(15).iter().all(|&s| s == 0));
        assert!(image.row(16).iter().all(|&s| s == 3));
    }

    #[test]
    fn test_to_bands_matches_input() {
        let payload: Vec<u8> = (0..BAND_BYTES).map(|i| (i * 7 % 251) as u8).collect();
        let mut image = RasterImage::new();
        image.append_tiles(&payload);
        assert_eq!(image.to_bands(), vec![payload]);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(RasterImage::from_pixels(16, vec![0; IMAGE_WIDTH * 16]).is_some());
        assert!(RasterImage::from_pixels(16, vec![0; 10]).is_none());
    }

    #[test]
    fn test_print_params_parse() {
        let params = PrintParams::parse(&[0x01, 0x13, 0xE4, 0x40]).unwrap();
        assert_eq!(params.sheets, 1);
        assert_eq!(params.margin_before, 1);
        assert_eq!(params.margin_after, 3);
        assert_eq!(params.palette, 0xE4);
        assert_eq!(params.exposure, 0x40);

        assert!(PrintParams::parse(&[0x01, 0x13]).is_none());
    }
}
