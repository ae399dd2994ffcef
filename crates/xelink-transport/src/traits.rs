use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TransportError};

/// A source of bytes, consumed one byte at a time.
///
/// `Ok(None)` means no byte arrived within the source's timeout (or the source
/// is non-blocking and currently empty). Callers may poll again later without
/// losing anything.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// Returns `Err(TransportError::Closed)` once the stream has ended.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// A sink that accepts complete byte buffers.
pub trait ByteSink {
    /// Write all of `bytes` and flush, or report why that was impossible.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<W: Write + ?Sized> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
