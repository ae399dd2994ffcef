//! Registered message types and their payload layouts.
//!
//! The framing layer treats the type tag as an opaque byte. The types below
//! give well-known tags a name and a payload schema.

use bytes::BytesMut;

use crate::codec::{encode_into, frame_size};
use crate::error::{FrameError, Result};

/// Payload length of a [`MessageType::Position`] message.
pub const POSITION_PAYLOAD_LEN: usize = 12;

/// Known message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum MessageType {
    /// Position report: x, y, z as little-endian `f32`.
    Position = 0x01,
}

impl MessageType {
    /// The on-wire tag.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Position => "POSITION",
        }
    }

    /// Fixed payload length implied by the tag, if the layout is fixed.
    pub fn expected_len(self) -> Option<usize> {
        match self {
            MessageType::Position => Some(POSITION_PAYLOAD_LEN),
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(MessageType::Position),
            other => Err(other),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value.as_u8()
    }
}

/// Returns a human-readable name for a type tag.
pub fn type_name(tag: u8) -> &'static str {
    match MessageType::try_from(tag) {
        Ok(known) => known.name(),
        Err(_) => "UNKNOWN",
    }
}

/// A 3D position report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Build a position from its three components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Serialize as three little-endian `f32` values.
    pub fn to_payload(&self) -> [u8; POSITION_PAYLOAD_LEN] {
        let mut out = [0u8; POSITION_PAYLOAD_LEN];
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.z.to_le_bytes());
        out
    }

    /// Parse a position payload. Anything but exactly 12 bytes is rejected.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let bytes: &[u8; POSITION_PAYLOAD_LEN] =
            payload.try_into().map_err(|_| FrameError::InvalidPayload {
                msg_type: MessageType::Position.as_u8(),
                expected: POSITION_PAYLOAD_LEN,
                actual: payload.len(),
            })?;

        let component = |at: usize| {
            f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Ok(Self {
            x: component(0),
            y: component(4),
            z: component(8),
        })
    }
}

/// Encode a complete position frame.
pub fn encode_position(position: &Position) -> Vec<u8> {
    let mut wire = BytesMut::with_capacity(frame_size(POSITION_PAYLOAD_LEN));
    // A 12-byte payload is always under the size limit.
    let _ = encode_into(
        MessageType::Position.as_u8(),
        &position.to_payload(),
        &mut wire,
    );
    wire.to_vec()
}
