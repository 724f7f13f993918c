//! # Transport Layer
//!
//! Byte sources feeding the decoder, and the device writer used to reach a
//! thermal printer.
//!
//! ## Available Transports
//!
//! - [`serial`]: The printer emulator's USB serial port
//! - [`replay`]: A captured byte stream played back in chunks
//! - [`device`]: Chunked writes to a printer character device
//! - [`tty`]: Raw-mode termios setup shared by the above

pub mod device;
pub mod replay;
pub mod serial;
pub mod tty;

use std::io;

pub use device::DeviceWriter;
pub use replay::ReplaySource;
pub use serial::SerialSource;

/// Where the raw link-cable bytes come from.
pub trait ByteSource {
    /// Read whatever is available into `buf`.
    ///
    /// Returns `Ok(0)` when nothing arrived within the source's timeout.
    /// Never blocks indefinitely.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Finite sources return true once every byte has been delivered.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Send acknowledgement bytes back toward the console.
    fn write_ack(&mut self, _ack: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_chunk(buf)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn write_ack(&mut self, ack: &[u8]) -> io::Result<()> {
        (**self).write_ack(ack)
    }
}
