//! # Output Sinks
//!
//! Destinations for finished, rendered images.
//!
//! - [`file`]: PNG files in an output directory
//! - [`printer`]: ESC/POS thermal printer
//! - [`MemorySink`]: keeps images in memory (tests, embedding)

pub mod file;
pub mod printer;

use std::cell::RefCell;
use std::rc::Rc;

pub use file::FileSink;
pub use printer::PrinterSink;

use crate::error::GbPrinterError;
use crate::render::RenderedImage;

/// Receives each finished image.
pub trait ImageSink {
    /// Short label used in log messages
    fn name(&self) -> &str;

    fn on_image_ready(&mut self, image: &RenderedImage) -> Result<(), GbPrinterError>;
}

/// Collects images in memory.
///
/// Clones share the same storage, so a test can hand one clone to the
/// service and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    images: Rc<RefCell<Vec<RenderedImage>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.borrow().is_empty()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<RenderedImage> {
        self.images.take()
    }
}

impl ImageSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn on_image_ready(&mut self, image: &RenderedImage) -> Result<(), GbPrinterError> {
        self.images.borrow_mut().push(image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use crate::render::{palette, render};

    #[test]
    fn test_memory_sink_clones_share_storage() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();

        let raster = RasterImage::from_pixels(16, vec![0; 160 * 16]).unwrap();
        let image = render(&raster, palette::default_palette(), 1).unwrap();
        handle.on_image_ready(&image).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take(), vec![image]);
        assert!(handle.is_empty());
    }
}
