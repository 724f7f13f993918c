//! # Raster Reconstruction
//!
//! Rebuilds the console's image from the tile data carried by Data packets.
//!
//! - [`tile`]: 2bpp tile decoding and encoding
//! - [`image`]: The [`RasterImage`] grid of shade indices
//! - [`assembler`]: Packet-driven image lifecycle

pub mod assembler;
pub mod image;
pub mod tile;

pub use assembler::{AssemblerEvent, IMAGE_BUFFER_BYTES, ImageAssembler};
pub use image::{IMAGE_WIDTH, PrintParams, RasterImage};
