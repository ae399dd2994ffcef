//! Byte-level transport contracts for the xelink framing protocol.
//!
//! The framing core never touches a device directly. It needs two things
//! from whatever carries its bytes:
//! - a [`ByteSource`] that hands over one byte at a time, or nothing when no
//!   byte arrived within the source's timeout
//! - a [`ByteSink`] that writes a complete buffer or reports failure
//!
//! Both are implemented for every `std::io::Read` / `std::io::Write`, so
//! sockets, pipes and cursors work out of the box. On Unix a raw-mode
//! [`SerialPort`] is provided as well.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use error::{Result, TransportError};
pub use traits::{ByteSink, ByteSource};

#[cfg(unix)]
pub use serial::{SerialConfig, SerialPort, DEFAULT_BAUD_RATE, SUPPORTED_BAUD_RATES};
