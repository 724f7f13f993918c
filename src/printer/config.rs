//! # Printer Configuration
//!
//! Hardware specifications for ESC/POS thermal printers.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Resolution |
//! |-------|--------------|------------|
//! | 58mm ESC/POS | 384 | 203 DPI |
//! | 80mm ESC/POS | 576 | 203 DPI |
//!
//! ## Usage
//!
//! ```
//! use gbprinter::printer::PrinterConfig;
//!
//! let config = PrinterConfig::ESCPOS_58MM;
//! assert_eq!(config.width_bytes(), 48);
//! ```

use serde::{Deserialize, Serialize};

/// # Printer Configuration
///
/// - **width_dots**: printable width of the head in dots
/// - **dpi**: resolution, used for mm conversions
/// - **max_chunk_rows**: rows per `GS v 0` command; cheap printers choke on
///   one huge raster block
/// - **feed_lines**: lines fed after an image so it clears the tear bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub width_dots: u16,
    pub dpi: u16,
    pub max_chunk_rows: u16,
    pub feed_lines: u8,
}

impl PrinterConfig {
    /// 58mm paper, the common USB receipt printer
    pub const ESCPOS_58MM: Self = Self {
        width_dots: 384,
        dpi: 203,
        max_chunk_rows: 128,
        feed_lines: 4,
    };

    /// 80mm paper
    pub const ESCPOS_80MM: Self = Self {
        width_dots: 576,
        dpi: 203,
        max_chunk_rows: 128,
        feed_lines: 4,
    };

    /// Same as the 58mm preset with a different head width.
    pub fn with_width(width_dots: u16) -> Self {
        Self {
            width_dots,
            ..Self::ESCPOS_58MM
        }
    }

    #[inline]
    pub fn width_bytes(&self) -> u16 {
        self.width_dots.div_ceil(8)
    }

    /// Calculate dots per millimeter
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::ESCPOS_58MM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(PrinterConfig::ESCPOS_58MM.width_bytes(), 48);
        assert_eq!(PrinterConfig::ESCPOS_80MM.width_bytes(), 72);
        assert!((PrinterConfig::ESCPOS_58MM.width_mm() - 48.0).abs() < 0.1);
    }

    #[test]
    fn test_with_width_rounds_bytes_up() {
        let config = PrinterConfig::with_width(385);
        assert_eq!(config.width_bytes(), 49);
        assert_eq!(config.dpi, 203);
    }
}
