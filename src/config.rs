//! # Service Configuration
//!
//! Everything the service needs to know, gathered into one struct and
//! passed in at construction. It can be loaded from a JSON file and
//! overridden from the command line.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "palette": "Original Game Boy",
//!   "scale": 4,
//!   "output_dir": "/home/me/prints",
//!   "printer": { "device": "/dev/usb/lp0", "width_dots": 384 }
//! }
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GbPrinterError;
use crate::printer::PrinterConfig;
use crate::render::palette::{self, DEFAULT_PALETTE, PALETTES, Palette};
use crate::transport::serial::DEFAULT_BAUD;

/// Largest accepted scale factor
pub const MAX_SCALE: u32 = 5;

/// Scale used when none is configured
pub const DEFAULT_SCALE: u32 = 3;

/// Name of the default output folder inside the system temp directory
const TMP_FOLDER_NAME: &str = "GameBoyPrinter";

/// `<system temp>/GameBoyPrinter`
pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join(TMP_FOLDER_NAME)
}

/// Thermal printer output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Character device of the printer, e.g. `/dev/usb/lp0`
    pub device: PathBuf,
    /// Print head width; defaults to the 58mm preset
    #[serde(default)]
    pub width_dots: Option<u16>,
}

impl PrinterSettings {
    pub fn printer_config(&self) -> PrinterConfig {
        self.width_dots
            .map_or(PrinterConfig::default(), PrinterConfig::with_width)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Palette index or name
    pub palette: String,
    /// Integer scale factor for saved images, 1..=5
    pub scale: u32,
    /// Directory receiving PNG files
    pub output_dir: PathBuf,
    /// Print on a thermal printer as well as saving files
    pub printer: Option<PrinterSettings>,
    /// Serial line speed
    pub baud: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            palette: PALETTES[DEFAULT_PALETTE].name.to_string(),
            scale: DEFAULT_SCALE,
            output_dir: default_output_dir(),
            printer: None,
            baud: DEFAULT_BAUD,
        }
    }
}

impl ServiceConfig {
    /// Load a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, GbPrinterError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GbPrinterError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            GbPrinterError::Config(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    /// Check the settings and resolve the palette.
    ///
    /// Thermal output is dithered from luminance, so only the default
    /// palette is allowed together with a printer.
    pub fn validate(&self) -> Result<&'static Palette, GbPrinterError> {
        let selected = palette::lookup(&self.palette)?;

        if !(1..=MAX_SCALE).contains(&self.scale) {
            return Err(GbPrinterError::Config(format!(
                "Scale must be between 1 and {}, got {}",
                MAX_SCALE, self.scale
            )));
        }

        if let Some(printer) = &self.printer {
            if selected != palette::default_palette() {
                return Err(GbPrinterError::Config(format!(
                    "Palette must be {} ({}) when using a printer",
                    DEFAULT_PALETTE,
                    palette::default_palette().name
                )));
            }
            if printer.printer_config().width_dots == 0 {
                return Err(GbPrinterError::Config(
                    "Printer width must be at least one dot".to_string(),
                ));
            }
        }

        Ok(selected)
    }

    /// Make sure the output directory exists.
    ///
    /// The default temp directory is created on demand; a directory the user
    /// chose must already exist.
    pub fn prepare_output_dir(&self) -> Result<(), GbPrinterError> {
        debug!(dir = %self.output_dir.display(), "preparing output directory");
        if self.output_dir == default_output_dir() {
            fs::create_dir_all(&self.output_dir)?;
            return Ok(());
        }
        if !self.output_dir.is_dir() {
            return Err(GbPrinterError::Config(format!(
                "The output folder {} does not exist",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ServiceConfig::default();
        assert_eq!(config.scale, 3);
        assert_eq!(config.validate().unwrap().name, "Grayscale");
    }

    #[test]
    fn test_scale_range() {
        let mut config = ServiceConfig::default();
        config.scale = 0;
        assert!(config.validate().is_err());
        config.scale = 6;
        assert!(config.validate().is_err());
        config.scale = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_printer_requires_default_palette() {
        let mut config = ServiceConfig {
            palette: "bgb emulator".to_string(),
            printer: Some(PrinterSettings {
                device: PathBuf::from("/dev/usb/lp0"),
                width_dots: None,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GbPrinterError::Config(_))));

        config.palette = "1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{ "palette": "2", "printer": { "device": "/dev/lp0" } }"#)
                .unwrap();
        assert_eq!(config.palette, "2");
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.output_dir, default_output_dir());
        assert_eq!(
            config.printer.unwrap().printer_config(),
            PrinterConfig::ESCPOS_58MM
        );
    }

    #[test]
    fn test_user_output_dir_must_exist() {
        let config = ServiceConfig {
            output_dir: PathBuf::from("/nonexistent/gbprinter/out"),
            ..Default::default()
        };
        assert!(config.prepare_output_dir().is_err());
    }
}
