//! # TTY Configuration
//!
//! Both ends of the bridge are character devices: the printer emulator's
//! USB serial port and, often, the thermal printer itself. Either one is
//! opened in raw mode so binary data passes through unmodified:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity, one stop bit)
//! - **No flow control**: XON/XOFF and RTS/CTS both off
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//!
//! Software flow control must stay off: 0x11 (XON) and 0x13 (XOFF) appear
//! freely in tile data.

use std::io;

use crate::error::GbPrinterError;

/// Settings applied on top of raw mode
#[derive(Debug, Clone, Copy, Default)]
pub struct TtySettings {
    /// Line speed, `None` leaves the current speed alone
    pub baud: Option<u32>,
    /// Read timeout in tenths of a second (VTIME, with VMIN = 0)
    pub read_timeout_ds: Option<u8>,
}

/// Map a numeric baud rate to its termios constant.
#[cfg(unix)]
fn baud_constant(baud: u32) -> Option<libc::speed_t> {
    Some(match baud {
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => return None,
    })
}

/// True when `fd` refers to a terminal device.
#[cfg(unix)]
pub fn is_tty(fd: i32) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(not(unix))]
pub fn is_tty(_fd: i32) -> bool {
    false
}

/// Configure a file descriptor for raw TTY mode.
#[cfg(unix)]
pub fn configure_raw(fd: i32, settings: TtySettings) -> Result<(), GbPrinterError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(GbPrinterError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // 8N1, receiver on, ignore modem lines, no hardware flow control
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB | libc::CRTSCTS);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    if let Some(timeout) = settings.read_timeout_ds {
        termios.c_cc[libc::VMIN] = 0;
        termios.c_cc[libc::VTIME] = timeout;
    }

    if let Some(baud) = settings.baud {
        let speed = baud_constant(baud).ok_or_else(|| {
            GbPrinterError::Config(format!("Unsupported baud rate {}", baud))
        })?;
        let result = unsafe {
            libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
        };
        if result != 0 {
            return Err(GbPrinterError::Transport(format!(
                "cfsetspeed failed: {}",
                io::Error::last_os_error()
            )));
        }
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(GbPrinterError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn configure_raw(_fd: i32, _settings: TtySettings) -> Result<(), GbPrinterError> {
    Ok(())
}

/// Discard anything already queued in either direction.
#[cfg(unix)]
pub fn flush_queues(fd: i32) {
    unsafe {
        libc::tcflush(fd, libc::TCIOFLUSH);
    }
}

#[cfg(not(unix))]
pub fn flush_queues(_fd: i32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_supported_bauds() {
        assert_eq!(baud_constant(115200), Some(libc::B115200));
        assert_eq!(baud_constant(9600), Some(libc::B9600));
        assert_eq!(baud_constant(12345), None);
    }

    #[test]
    fn test_regular_file_is_not_tty() {
        use std::os::unix::io::AsRawFd;

        let path = std::env::temp_dir().join(format!("gbprinter-tty-{}", uuid::Uuid::new_v4()));
        let file = std::fs::File::create(&path).unwrap();
        assert!(!is_tty(file.as_raw_fd()));
        assert!(configure_raw(file.as_raw_fd(), TtySettings::default()).is_err());
        std::fs::remove_file(path).unwrap();
    }
}
