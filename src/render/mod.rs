//! # Rendering Module
//!
//! Turns a finished [`RasterImage`] into colored pixels.
//!
//! ## Modules
//!
//! - [`palette`]: Named 4-color palettes
//! - [`dither`]: Bayer 8x8 ordered dithering for 1-bit thermal output
//!
//! ## Usage Example
//!
//! ```
//! use gbprinter::raster::RasterImage;
//! use gbprinter::render::{self, palette};
//!
//! let raster = RasterImage::from_pixels(16, vec![0; 160 * 16]).unwrap();
//! let rendered = render::render(&raster, palette::default_palette(), 2).unwrap();
//!
//! assert_eq!(rendered.width(), 320);
//! assert_eq!(rendered.height(), 32);
//! assert_eq!(rendered.pixel(0, 0), 0xFFFFFF);
//! ```

pub mod dither;
pub mod palette;

use image::{Rgb, RgbImage};
use rayon::prelude::*;

pub use palette::Palette;

use crate::error::RenderError;
use crate::raster::RasterImage;

/// RGB pixel grid, each pixel `0xRRGGBB`, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl RenderedImage {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.pixels.chunks_exact(self.width.max(1))
    }

    /// Convert to an `image` buffer for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let [_, r, g, b] = self.pixel(x as usize, y as usize).to_be_bytes();
            Rgb([r, g, b])
        })
    }
}

/// Apply `palette` to every shade and scale by `scale` (nearest neighbor).
///
/// ## Errors
///
/// - [`RenderError::InvalidScale`] when `scale` is 0, or so large the
///   output size overflows `usize`
/// - [`RenderError::ShadeIndexOutOfRange`] when the raster holds a shade
///   above 3, which means the assembler produced a corrupt image
pub fn render(
    raster: &RasterImage,
    palette: &Palette,
    scale: u32,
) -> Result<RenderedImage, RenderError> {
    let invalid = || RenderError::InvalidScale(scale);
    if scale == 0 {
        return Err(invalid());
    }
    let factor = scale as usize;
    let width = raster.width().checked_mul(factor).ok_or_else(invalid)?;
    let height = raster.height().checked_mul(factor).ok_or_else(invalid)?;
    let band_len = width.checked_mul(factor).ok_or_else(invalid)?;
    let len = width.checked_mul(height).ok_or_else(invalid)?;

    // One source row fills `scale` output rows; rows are independent.
    let mut pixels = vec![0u32; len];
    pixels
        .par_chunks_mut(band_len.max(1))
        .enumerate()
        .try_for_each(|(y, band)| {
            let (line, rest) = band.split_at_mut(width);
            for (x, &shade) in raster.row(y).iter().enumerate() {
                let color = palette
                    .color(shade)
                    .ok_or(RenderError::ShadeIndexOutOfRange { x, y, shade })?;
                line[x * factor..(x + 1) * factor].fill(color);
            }
            for copy in rest.chunks_exact_mut(width.max(1)) {
                copy.copy_from_slice(line);
            }
            Ok::<(), RenderError>(())
        })?;

    Ok(RenderedImage {
        width,
        height,
        pixels,
    })
}
