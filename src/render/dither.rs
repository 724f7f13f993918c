//! # Bayer 8x8 Ordered Dithering
//!
//! Thermal printers only print black or white dots. Rendered images carry
//! four palette colors, so before printing each pixel's darkness is compared
//! against a Bayer threshold matrix:
//!
//! 1. Look up a threshold from the matrix using `(x mod 8, y mod 8)`
//! 2. Compute the pixel's darkness (0.0 = white, 1.0 = black)
//! 3. Print a dot when darkness > threshold
//!
//! With the Grayscale palette the four shades come out as roughly 0%, 33%,
//! 67% and 100% dot coverage.
//!
//! ## Usage Example
//!
//! ```
//! use gbprinter::render::dither;
//!
//! // Black always prints, white never does
//! assert!(dither::should_print(3, 5, 1.0));
//! assert!(!dither::should_print(3, 5, 0.0));
//!
//! let row = vec![true, true, false, false, true, false, true, false];
//! assert_eq!(dither::pack_row(&row), vec![0xCA]);
//! ```

use super::RenderedImage;

/// Bayer 8x8 dithering matrix, values 0-63
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold in (0, 1) for a pixel position.
///
/// `(value + 0.5) / 64` keeps pure black always printing and pure white
/// never printing.
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER8[y & 7][x & 7];
    (matrix_value as f32 + 0.5) / 64.0
}

#[inline]
pub fn should_print(x: usize, y: usize, darkness: f32) -> bool {
    darkness > threshold(x, y)
}

/// Darkness of a `0xRRGGBB` color using Rec. 601 luma weights.
#[inline]
pub fn darkness(rgb: u32) -> f32 {
    let [_, r, g, b] = rgb.to_be_bytes();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    1.0 - luma / 255.0
}

/// Pack booleans into bytes, MSB = leftmost, padded with white.
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// Dither a rendered image into packed 1-bit rows `width_dots` wide.
///
/// Images narrower than the print head are centered. Wider images are
/// shrunk (nearest neighbor, aspect ratio kept) to fit.
///
/// Returns `(height, data)` with `data.len() == width_dots.div_ceil(8) * height`.
pub fn dither_image(image: &RenderedImage, width_dots: usize) -> (usize, Vec<u8>) {
    let (src_w, src_h) = (image.width(), image.height());
    if src_w == 0 || src_h == 0 || width_dots == 0 {
        return (0, Vec::new());
    }

    let (out_w, out_h) = if src_w <= width_dots {
        (src_w, src_h)
    } else {
        (width_dots, (src_h * width_dots / src_w).max(1))
    };
    let left = (width_dots - out_w) / 2;

    let mut data = Vec::with_capacity(width_dots.div_ceil(8) * out_h);
    let mut row = vec![false; width_dots];
    for y in 0..out_h {
        let sy = y * src_h / out_h;
        row.fill(false);
        for x in 0..out_w {
            let sx = x * src_w / out_w;
            let dot_x = left + x;
            row[dot_x] = should_print(dot_x, y, darkness(image.pixel(sx, sy)));
        }
        data.extend(pack_row(&row));
    }

    (out_h, data)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{IMAGE_WIDTH, RasterImage};
    use crate::render::{palette, render};

    fn solid(shade: u8, scale: u32) -> RenderedImage {
        let raster = RasterImage::from_pixels(16, vec![shade; IMAGE_WIDTH * 16]).unwrap();
        render(&raster, palette::default_palette(), scale).unwrap()
    }

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 64];
        for row in &BAYER8 {
            for &val in row {
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_darkness_extremes() {
        assert!(darkness(0xFFFFFF).abs() < 1e-4);
        assert!((darkness(0x000000) - 1.0).abs() < 1e-4);
        let mid = darkness(0x808080);
        assert!(mid > 0.45 && mid < 0.55);
    }

    #[test]
    fn test_pack_row_padding() {
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_white_image_prints_nothing() {
        let (height, data) = dither_image(&solid(0, 1), 384);
        assert_eq!(height, 16);
        assert_eq!(data.len(), 48 * 16);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_black_image_is_centered() {
        // 160 px in 384 dots: 112 dots of margin each side
        let (_, data) = dither_image(&solid(3, 1), 384);
        let first_row = &data[..48];
        assert_eq!(first_row[13], 0x00); // dots 104..112
        assert_eq!(first_row[14], 0xFF); // dots 112..120
        assert_eq!(first_row[33], 0xFF); // dots 264..272
        assert_eq!(first_row[34], 0x00); // dots 272..280
    }

    #[test]
    fn test_wide_image_shrinks_to_fit() {
        // Scale 3 gives 480x48; fit into 384 keeps aspect -> 384x38
        let (height, data) = dither_image(&solid(3, 3), 384);
        assert_eq!(height, 38);
        assert_eq!(data.len(), 48 * 38);
        assert!(data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_gray_shades_partial_coverage() {
        let (_, data) = dither_image(&solid(1, 1), 160);
        let dots: u32 = data.iter().map(|b| b.count_ones()).sum();
        let total = (160 * 16) as f32;
        let coverage = dots as f32 / total;
        assert!(coverage > 0.25 && coverage < 0.42, "coverage {}", coverage);
    }
}
