//! # PNG File Sink
//!
//! Saves every image as a PNG in the output directory. File names carry a
//! local timestamp and a short random suffix so two prints in the same
//! second never collide:
//!
//! ```text
//! gbprinter_20261019_142233_3f9c21ab.png
//! ```

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;
use uuid::Uuid;

use super::ImageSink;
use crate::error::GbPrinterError;
use crate::render::RenderedImage;

pub struct FileSink {
    directory: PathBuf,
    last_saved: Option<PathBuf>,
}

impl FileSink {
    /// Sink writing into `directory`, which must already exist.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            last_saved: None,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the most recently saved file
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    fn next_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        self.directory
            .join(format!("gbprinter_{}_{}.png", stamp, &suffix[..8]))
    }
}

impl ImageSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn on_image_ready(&mut self, image: &RenderedImage) -> Result<(), GbPrinterError> {
        let path = self.next_path();
        image
            .to_rgb_image()
            .save(&path)
            .map_err(|e| GbPrinterError::Image(format!("Failed to save PNG: {}", e)))?;

        info!(path = %path.display(), "image saved");
        println!("File saved to {}", path.display());
        self.last_saved = Some(path);
        Ok(())
    }
}
