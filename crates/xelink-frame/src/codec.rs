use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::message::MessageType;

/// First header byte.
pub const HEADER_1: u8 = 0xAB;

/// Second header byte.
pub const HEADER_2: u8 = 0xCD;

/// Frame header: `0xAB 0xCD`.
pub const HEADER: [u8; 2] = [HEADER_1, HEADER_2];

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Bytes a frame adds around its payload: header (2) + type (1) + length (1) + checksum (1).
pub const OVERHEAD: usize = 5;

/// Size of a frame carrying a maximum-length payload.
pub const MAX_FRAME_SIZE: usize = OVERHEAD + MAX_PAYLOAD_SIZE;

// Reflected form of the CRC-8/MAXIM polynomial 0x31.
const CRC8_MAXIM_POLY_REFLECTED: u8 = 0x8C;

/// A validated message: its type tag and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type tag. Opaque to the framing layer.
    pub msg_type: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(msg_type: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            msg_type,
            payload: payload.into(),
        }
    }

    /// The registered message type for this tag, if any.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::try_from(self.msg_type).ok()
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        frame_size(self.payload.len())
    }
}

/// Wire size of a frame carrying `payload_len` bytes.
pub const fn frame_size(payload_len: usize) -> usize {
    OVERHEAD + payload_len
}

/// CRC-8/MAXIM (Dallas 1-Wire): reflected polynomial 0x8C, init 0x00, no final xor.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |crc, &byte| crc8_update(crc, byte))
}

fn crc8_update(mut crc: u8, byte: u8) -> u8 {
    crc ^= byte;
    for _ in 0..8 {
        crc = if crc & 0x01 != 0 {
            (crc >> 1) ^ CRC8_MAXIM_POLY_REFLECTED
        } else {
            crc >> 1
        };
    }
    crc
}

/// Encode a message into a new buffer.
///
/// Wire format:
/// ```text
/// ┌─────────────┬──────┬────────┬──────────────┬──────────┐
/// │ Header (2B) │ Type │ Length │ Payload      │ CRC-8    │
/// │ 0xAB 0xCD   │ (1B) │ (1B)   │ (Length B)   │ (1B)     │
/// └─────────────┴──────┴────────┴──────────────┴──────────┘
/// ```
///
/// The checksum covers type, length and payload; the header is excluded.
pub fn encode(msg_type: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let mut dst = BytesMut::with_capacity(frame_size(payload.len().min(MAX_PAYLOAD_SIZE)));
    encode_into(msg_type, payload, &mut dst)?;
    Ok(dst.to_vec())
}

/// Encode a message, appending the frame to `dst`.
///
/// Nothing is appended when the payload is rejected.
pub fn encode_into(msg_type: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = u8::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD_SIZE,
    })?;

    let crc = payload
        .iter()
        .fold(crc8_update(crc8_update(0, msg_type), len), |crc, &byte| {
            crc8_update(crc, byte)
        });

    dst.reserve(frame_size(payload.len()));
    dst.put_slice(&HEADER);
    dst.put_u8(msg_type);
    dst.put_u8(len);
    dst.put_slice(payload);
    dst.put_u8(crc);
    Ok(())
}

/// Configuration for blocking frame readers and writers.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Read timeout applied to the transport, where it supports one.
    pub read_timeout: Option<std::time::Duration>,
}
