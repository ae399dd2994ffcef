//! CRC-8 checked binary framing for unreliable byte streams.
//!
//! Every message is framed as:
//! - a 2-byte header `0xAB 0xCD` for stream synchronization
//! - a 1-byte message type tag
//! - a 1-byte payload length (0..=255)
//! - the payload
//! - a 1-byte CRC-8/MAXIM over type, length and payload
//!
//! [`FrameParser`] recovers frames one byte at a time from a stream that may
//! start mid-frame or carry noise. [`encode`] builds frames for sending.

pub mod codec;
pub mod error;
pub mod message;
pub mod parser;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{
    checksum, encode, encode_into, frame_size, Frame, FrameConfig, HEADER, HEADER_1, HEADER_2,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, OVERHEAD,
};
pub use error::{FrameError, Result};
pub use message::{encode_position, type_name, MessageType, Position, POSITION_PAYLOAD_LEN};
pub use parser::{FrameParser, ParserState, ParserStats};
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::XeCodec;
