//! # Printer Module
//!
//! Thermal printer specifics used by the printer output sink.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications
//! - [`escpos`]: ESC/POS command builders

pub mod config;
pub mod escpos;

pub use config::PrinterConfig;
