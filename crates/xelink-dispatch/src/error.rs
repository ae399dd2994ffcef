use xelink_frame::FrameError;

/// Errors that can occur while registering or dispatching handlers.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No handler registered for the type tag.
    #[error("no handler registered for type {0:#04x}")]
    UnknownType(u8),

    /// A handler is already registered for the type tag.
    #[error("handler already registered for type {0:#04x}")]
    DuplicateType(u8),

    /// The payload length does not match the registered length.
    #[error("payload length mismatch for type {msg_type:#04x} ({actual} bytes, expected {expected})")]
    LengthMismatch {
        msg_type: u8,
        expected: usize,
        actual: usize,
    },

    /// Payload decoding failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The handler reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
