use xelink_transport::TransportError;

/// Errors that can occur while encoding frames or driving a transport.
///
/// Malformed input bytes are never an error: the parser drops bad frames and
/// resynchronizes on its own.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A payload does not have the layout its message type requires.
    #[error("invalid payload for type {msg_type:#04x} ({actual} bytes, expected {expected})")]
    InvalidPayload {
        msg_type: u8,
        expected: usize,
        actual: usize,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The stream ended between frames.
    #[error("connection closed")]
    ConnectionClosed,

    /// The stream ended while a frame was partially received.
    #[error("connection closed (incomplete frame)")]
    IncompleteFrame,
}

impl From<TransportError> for FrameError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Io(io) => FrameError::Io(io),
            TransportError::Closed => FrameError::ConnectionClosed,
            other => FrameError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
