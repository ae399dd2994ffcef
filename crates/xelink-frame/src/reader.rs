use xelink_transport::{ByteSource, TransportError};

use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::parser::{FrameParser, ParserStats};

/// Reads complete frames from any [`ByteSource`].
///
/// Bytes are pulled one at a time and pushed through a [`FrameParser`], so
/// noise and corrupt frames are skipped transparently. Partial frames survive
/// across calls and across source timeouts.
pub struct FrameReader<T> {
    inner: T,
    parser: FrameParser,
    config: FrameConfig,
}

impl<T: ByteSource> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            parser: FrameParser::new(),
            config,
        }
    }

    /// Read bytes until a frame completes or the source times out.
    ///
    /// Returns `Ok(None)` when the source had no byte within its timeout.
    /// At end of stream returns `Err(FrameError::ConnectionClosed)`, or
    /// `Err(FrameError::IncompleteFrame)` if a frame was cut off.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            let byte = match self.inner.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return Ok(None),
                Err(TransportError::Closed) => return Err(self.closed_error()),
                Err(err) => return Err(err.into()),
            };

            if let Some(frame) = self.parser.feed(byte) {
                return Ok(Some(frame));
            }
        }
    }

    /// Read the next complete frame (blocking), riding out source timeouts.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.poll_frame()? {
                return Ok(frame);
            }
        }
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The parser driven by this reader.
    pub fn parser(&self) -> &FrameParser {
        &self.parser
    }

    /// Parser diagnostic counters.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.parser.reset();
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn closed_error(&self) -> FrameError {
        if self.parser.is_mid_frame() {
            FrameError::IncompleteFrame
        } else {
            FrameError::ConnectionClosed
        }
    }
}

#[cfg(unix)]
impl FrameReader<xelink_transport::SerialPort> {
    /// Create a frame reader for a serial port and apply the read timeout from config.
    pub fn with_config_serial(
        inner: xelink_transport::SerialPort,
        config: FrameConfig,
    ) -> Result<Self> {
        if let Some(timeout) = config.read_timeout {
            inner.set_read_timeout(timeout)?;
        }
        Ok(Self::with_config(inner, config))
    }
}
