//! # Serial Byte Source
//!
//! Reads the printer emulator's USB serial port.
//!
//! The port is opened read/write in raw mode at 115200 baud, 8N1, no flow
//! control. Reads use a short VTIME timeout so an idle link returns an empty
//! read instead of blocking the service loop forever.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use tracing::debug;

use super::ByteSource;
use super::tty::{self, TtySettings};
use crate::error::GbPrinterError;

/// Line speed used by the printer emulator firmware
pub const DEFAULT_BAUD: u32 = 115_200;

/// Read timeout in tenths of a second
const READ_TIMEOUT_DS: u8 = 1;

/// A serial port delivering the raw link-cable byte stream.
pub struct SerialSource {
    file: File,
}

impl SerialSource {
    /// Open and configure a serial device.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, baud: u32) -> Result<Self, GbPrinterError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                GbPrinterError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let fd = file.as_raw_fd();
        tty::configure_raw(
            fd,
            TtySettings {
                baud: Some(baud),
                read_timeout_ds: Some(READ_TIMEOUT_DS),
            },
        )?;
        tty::flush_queues(fd);

        debug!(device = %path.display(), baud, "serial port open");
        Ok(Self { file })
    }
}

impl ByteSource for SerialSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write_ack(&mut self, ack: &[u8]) -> io::Result<()> {
        self.file.write_all(ack)?;
        self.file.flush()
    }
}
