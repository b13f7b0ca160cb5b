//! # RS-232 Serial Transport
//!
//! This module provides communication with the ScopeMeter over a serial
//! port, typically a USB adapter such as `/dev/ttyUSB0` wired to the
//! instrument's optical interface cable.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary graphics data is passed
//! through unmodified:
//!
//! - **Raw mode**: `cfmakeraw` (no input/output processing, no echo,
//!   non-canonical)
//! - **8N1**: CS8, no parity
//! - **No modem control**: CLOCAL (ignore DCD), CREAD, no RTS/CTS
//! - **Timed reads**: VMIN = 0, VTIME from config, so a read returns
//!   zero bytes if the instrument stays quiet for the timeout
//!
//! ## Opening Without DCD
//!
//! The optical cable does not drive carrier detect. Opening a TTY in
//! blocking mode would wait for DCD forever, so the device is opened with
//! `O_NONBLOCK` and switched back to blocking once CLOCAL is in place.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use super::ByteChannel;
use crate::error::ScopeshotError;
use crate::instrument::InstrumentConfig;

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// # Serial Instrument Transport
///
/// ## Example
///
/// ```no_run
/// use scopeshot::instrument::InstrumentConfig;
/// use scopeshot::transport::{ByteChannel, SerialTransport};
///
/// let config = InstrumentConfig::SCOPEMETER_99;
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", &config)?;
///
/// transport.write_all(b"ID\r")?;
///
/// # Ok::<(), scopeshot::error::ScopeshotError>(())
/// ```
pub struct SerialTransport {
    file: File,
    path: PathBuf,
}

impl SerialTransport {
    /// Open and configure a serial device.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - The configured baud rate has no termios equivalent
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, config: &InstrumentConfig) -> Result<Self, ScopeshotError> {
        let path = device.as_ref();

        let speed = speed_for(config.baud_rate).ok_or_else(|| {
            ScopeshotError::Channel(format!("Unsupported baud rate {}", config.baud_rate))
        })?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| {
                ScopeshotError::Channel(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let fd = file.as_raw_fd();
        clear_nonblocking(fd)?;
        configure_tty_raw(fd, speed, config.vtime())?;

        log::debug!(
            "Opened {} at {} baud, read timeout {} ds",
            path.display(),
            config.baud_rate,
            config.vtime()
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the opened device
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteChannel for SerialTransport {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.file.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.file.flush()
    }
}

/// Map a baud rate to its termios speed constant.
fn speed_for(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        _ => return None,
    };
    Some(speed)
}

fn clear_nonblocking(fd: i32) -> Result<(), ScopeshotError> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(ScopeshotError::Channel(format!(
            "fcntl(F_GETFL) failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if result < 0 {
        return Err(ScopeshotError::Channel(format!(
            "fcntl(F_SETFL) failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// Configure a file descriptor for raw 8N1 at `speed` with timed reads.
///
/// Note: pending input is discarded (TCSAFLUSH) so a half-sent reply from
/// an earlier session can't be mistaken for the next ack.
fn configure_tty_raw(fd: i32, speed: libc::speed_t, vtime: u8) -> Result<(), ScopeshotError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ScopeshotError::Channel(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    unsafe {
        libc::cfmakeraw(&mut termios);
        libc::cfsetispeed(&mut termios, speed);
        libc::cfsetospeed(&mut termios, speed);
    }

    // 8 data bits, no parity, receiver on, ignore modem lines, no hardware handshake
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CRTSCTS);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = vtime;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &termios) };
    if result != 0 {
        return Err(ScopeshotError::Channel(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_DEVICE, "/dev/ttyUSB0");
    }

    #[test]
    fn test_speed_for_reference_baud() {
        assert_eq!(speed_for(1200), Some(libc::B1200));
        assert_eq!(speed_for(9600), Some(libc::B9600));
    }

    #[test]
    fn test_speed_for_unsupported_baud() {
        assert_eq!(speed_for(0), None);
        assert_eq!(speed_for(1201), None);
        assert_eq!(speed_for(115_200), None);
    }

    #[test]
    fn test_open_missing_device() {
        let result = SerialTransport::open(
            "/dev/does-not-exist-scopeshot",
            &InstrumentConfig::SCOPEMETER_99,
        );
        assert!(matches!(result, Err(ScopeshotError::Channel(_))));
    }

    #[test]
    fn test_open_rejects_unsupported_baud() {
        let config = InstrumentConfig {
            baud_rate: 1234,
            ..Default::default()
        };
        let result = SerialTransport::open("/dev/null", &config);
        assert!(matches!(result, Err(ScopeshotError::Channel(_))));
    }
}
