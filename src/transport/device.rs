//! # Printer Device Writer
//!
//! Writes print jobs to a thermal printer's character device, e.g.
//! `/dev/usb/lp0` or a USB serial adapter.
//!
//! ## Chunked Writes
//!
//! Large writes are split into chunks with a short delay between them so
//! cheap printers with small receive buffers keep up. If the device is a TTY
//! it is switched to raw mode first.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::tty::{self, TtySettings};
use crate::error::GbPrinterError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 1024;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 5;

/// A printer device opened for writing.
pub struct DeviceWriter {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceWriter {
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, GbPrinterError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            GbPrinterError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let fd = file.as_raw_fd();
        if tty::is_tty(fd) {
            tty::configure_raw(fd, TtySettings::default())?;
        }

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Set the chunk size for large writes. Default is 1024 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 5ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }
}

impl Write for DeviceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = buf.len().min(self.chunk_size);
        let written = self.file.write(&buf[..end])?;
        if written == self.chunk_size && !self.chunk_delay.is_zero() {
            thread::sleep(self.chunk_delay);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_plain_file_in_chunks() {
        let path = std::env::temp_dir().join(format!("gbprinter-dev-{}", uuid::Uuid::new_v4()));
        std::fs::File::create(&path).unwrap();

        let mut writer = DeviceWriter::open(&path).unwrap();
        writer.set_chunk_size(7);
        writer.set_chunk_delay(Duration::ZERO);
        let data: Vec<u8> = (0..100).collect();
        writer.write_all(&data).unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), data);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_device() {
        assert!(matches!(
            DeviceWriter::open("/nonexistent/lp0"),
            Err(GbPrinterError::Transport(_))
        ));
    }
}
