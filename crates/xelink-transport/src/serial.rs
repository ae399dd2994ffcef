use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default line speed.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Baud rates with a portable termios mapping.
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [9_600, 19_200, 38_400, 57_600, 115_200, 230_400];

/// Line settings applied when a serial device is opened.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed in bits per second. Default: 115200.
    pub baud_rate: u32,
    /// How long a read waits for the first byte before reporting a timeout.
    /// Rounded to tenths of a second and clamped to 0.1s..=25.5s.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// A tty device in raw 8N1 mode.
///
/// Reads use short-timeout semantics: a read that sees no byte within the
/// configured timeout fails with `ErrorKind::TimedOut`, which the blanket
/// [`ByteSource`](crate::ByteSource) impl reports as "no byte yet".
/// A line that has hung up (an unplugged USB adapter, a closed pty master)
/// reads as end of stream instead, which surfaces as
/// `TransportError::Closed`.
pub struct SerialPort {
    file: File,
    path: PathBuf,
}

impl SerialPort {
    /// Open a serial device and put it into raw mode.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let speed = baud_to_speed(config.baud_rate)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|e| TransportError::Open {
                path: path.clone(),
                source: e,
            })?;

        apply_line_settings(&file, speed, config.read_timeout).map_err(|e| {
            TransportError::Configure {
                path: path.clone(),
                source: e,
            }
        })?;

        info!(?path, baud = config.baud_rate, "opened serial port");

        Ok(Self { file, path })
    }

    /// Change the read timeout on an open port.
    pub fn set_read_timeout(&self, timeout: Duration) -> Result<()> {
        let fd = self.file.as_raw_fd();
        let mut tty = get_termios(fd).map_err(|e| self.configure_error(e))?;
        tty.c_cc[libc::VTIME] = timeout_deciseconds(timeout);
        set_termios(fd, &tty).map_err(|e| self.configure_error(e))?;
        debug!(path = ?self.path, ?timeout, "updated serial read timeout");
        Ok(())
    }

    /// Number of received bytes waiting in the driver's input queue.
    pub fn bytes_available(&self) -> Result<usize> {
        let mut count: libc::c_int = 0;
        // SAFETY: `count` is a valid writable c_int and the descriptor is an
        // open tty owned by `self.file`.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), libc::FIONREAD, &mut count) };
        if rc != 0 {
            return Err(TransportError::Io(std::io::Error::last_os_error()));
        }
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Open a second handle to the same device, e.g. for a writer context.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            file: self.file.try_clone()?,
            path: self.path.clone(),
        })
    }

    /// The device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "serial"
    }

    fn configure_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Configure {
            path: self.path.clone(),
            source,
        }
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        // With VMIN = 0 the driver signals an expired VTIME as a zero-length
        // read. A hung-up line reads zero as well and must surface as EOF.
        match self.file.read(buf) {
            Ok(0) if !buf.is_empty() => {
                if hung_up(self.file.as_raw_fd())? {
                    debug!(path = ?self.path, "serial line hung up");
                    Ok(0)
                } else {
                    Err(std::io::Error::from(ErrorKind::TimedOut))
                }
            }
            other => other,
        }
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // SAFETY: the descriptor is an open tty owned by `self.file`.
        if unsafe { libc::tcdrain(self.file.as_raw_fd()) } != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .finish()
    }
}

fn baud_to_speed(baud_rate: u32) -> Result<libc::speed_t> {
    let speed = match baud_rate {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => return Err(TransportError::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

fn timeout_deciseconds(timeout: Duration) -> libc::cc_t {
    let tenths = (timeout.as_millis() + 50) / 100;
    tenths.clamp(1, 255) as libc::cc_t
}

fn apply_line_settings(
    file: &File,
    speed: libc::speed_t,
    read_timeout: Duration,
) -> std::io::Result<()> {
    let fd = file.as_raw_fd();
    let mut tty = get_termios(fd)?;

    // SAFETY: `tty` is a fully initialised termios obtained from tcgetattr.
    unsafe {
        libc::cfmakeraw(&mut tty);
        if libc::cfsetispeed(&mut tty, speed) != 0 || libc::cfsetospeed(&mut tty, speed) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }

    tty.c_cflag |= libc::CLOCAL | libc::CREAD;
    tty.c_cflag &= !libc::CSTOPB;
    tty.c_cc[libc::VMIN] = 0;
    tty.c_cc[libc::VTIME] = timeout_deciseconds(read_timeout);

    set_termios(fd, &tty)?;

    // Drop anything that arrived before the line was configured.
    // SAFETY: `fd` is an open tty descriptor.
    if unsafe { libc::tcflush(fd, libc::TCIFLUSH) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Non-blocking check for a hang-up or error condition on `fd`.
fn hung_up(fd: libc::c_int) -> std::io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: `pfd` is a single valid pollfd; a zero timeout never blocks.
    if unsafe { libc::poll(&mut pfd, 1, 0) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(pfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0)
}

fn get_termios(fd: libc::c_int) -> std::io::Result<libc::termios> {
    let mut tty = std::mem::MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr fully initialises the termios struct when it returns 0.
    if unsafe { libc::tcgetattr(fd, tty.as_mut_ptr()) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: checked the return code above.
    Ok(unsafe { tty.assume_init() })
}

fn set_termios(fd: libc::c_int, tty: &libc::termios) -> std::io::Result<()> {
    // SAFETY: `tty` points to a valid termios for the duration of the call.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, tty) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
