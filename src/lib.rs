//! # gbprinter - Game Boy Printer Emulation Library
//!
//! gbprinter receives the byte stream a Game Boy sends to its printer
//! accessory, usually through a microcontroller bridge on a USB serial port,
//! and turns it back into pictures. It provides:
//!
//! - **Protocol decoding**: sync framing, checksums, run-length payloads
//! - **Image assembly**: 2bpp tiles stitched into a 160 pixel wide raster
//! - **Rendering**: named 4-color palettes, nearest-neighbor scaling
//! - **Output**: PNG files and ESC/POS thermal printers
//!
//! ## Quick Start
//!
//! ```no_run
//! use gbprinter::{
//!     config::ServiceConfig,
//!     output::FileSink,
//!     service::PrinterService,
//!     transport::SerialSource,
//! };
//!
//! let config = ServiceConfig::default();
//! config.prepare_output_dir()?;
//!
//! // Open the bridge's serial port
//! let source = SerialSource::open("/dev/ttyACM0", config.baud)?;
//!
//! // Save every printed picture as a PNG
//! let mut service = PrinterService::new(source, &config)?
//!     .with_sink(Box::new(FileSink::new(&config.output_dir)));
//!
//! service.run()?;
//!
//! # Ok::<(), gbprinter::error::GbPrinterError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Framing, packet decoding, compression |
//! | [`raster`] | Tile decoding and image assembly |
//! | [`render`] | Palettes, scaling, dithering |
//! | [`pipeline`] | Bytes in, packets and images out |
//! | [`service`] | The read loop |
//! | [`output`] | Image sinks |
//! | [`transport`] | Serial port, replay, printer device |
//! | [`printer`] | Thermal printer configurations |
//! | [`config`] | Service configuration |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod render;
pub mod service;
pub mod transport;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use error::GbPrinterError;
pub use pipeline::{Pipeline, PipelineEvent};
pub use protocol::{Command, Packet};
pub use raster::RasterImage;
pub use render::RenderedImage;
pub use service::PrinterService;
