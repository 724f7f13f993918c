//! # Thermal Printer Sink
//!
//! Prints images on an ESC/POS thermal printer.
//!
//! ## Print Job Layout
//!
//! ```text
//! ESC @                      initialize
//! GS v 0 ... (≤ chunk rows)  raster chunk 1
//! GS v 0 ...                 raster chunk 2
//! ...
//! ESC d n                    feed past the tear bar
//! GS V 66 0                  partial cut (ignored without a cutter)
//! ```
//!
//! Colors are reduced to 1 bit with Bayer dithering; see
//! [`dither`](crate::render::dither).

use std::io::Write;

use tracing::info;

use super::ImageSink;
use crate::error::GbPrinterError;
use crate::printer::{PrinterConfig, escpos};
use crate::render::{RenderedImage, dither};

pub struct PrinterSink<W: Write> {
    writer: W,
    config: PrinterConfig,
}

impl<W: Write> PrinterSink<W> {
    pub fn new(writer: W, config: PrinterConfig) -> Self {
        Self { writer, config }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Build the complete byte sequence for one image.
pub fn print_job(config: &PrinterConfig, image: &RenderedImage) -> Vec<u8> {
    let width_dots = config.width_dots as usize;
    let (height, data) = dither::dither_image(image, width_dots);
    let row_bytes = (config.width_bytes() as usize).max(1);
    let chunk_rows = config.max_chunk_rows.max(1) as usize;

    let mut job = escpos::init();
    for chunk in data.chunks(row_bytes * chunk_rows) {
        let rows = chunk.len() / row_bytes;
        job.extend(escpos::raster(config.width_dots, rows as u16, chunk));
    }
    debug_assert_eq!(data.len(), row_bytes * height);

    job.extend(escpos::feed_lines(config.feed_lines));
    job.extend(escpos::cut_partial_feed(0));
    job
}

impl<W: Write> ImageSink for PrinterSink<W> {
    fn name(&self) -> &str {
        "printer"
    }

    fn on_image_ready(&mut self, image: &RenderedImage) -> Result<(), GbPrinterError> {
        let job = print_job(&self.config, image);
        self.writer
            .write_all(&job)
            .and_then(|_| self.writer.flush())
            .map_err(|e| GbPrinterError::Transport(format!("Write failed: {}", e)))?;

        info!(bytes = job.len(), "image sent to printer");
        Ok(())
    }
}
