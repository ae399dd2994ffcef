use bytes::Bytes;
use tracing::debug;

use crate::codec::{checksum, Frame, HEADER_1, HEADER_2, MAX_PAYLOAD_SIZE};

// type + length + payload
const BUFFER_CAPACITY: usize = MAX_PAYLOAD_SIZE + 2;

/// Where the parser is within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Hunting for the first header byte.
    AwaitHeader1,
    /// Saw the first header byte; expecting the second.
    AwaitHeader2,
    /// Header matched; next byte is the type tag.
    ReadType,
    /// Next byte is the payload length.
    ReadLength,
    /// Collecting payload bytes.
    ReadPayload,
    /// Next byte is the checksum.
    ReadChecksum,
}

/// Diagnostic counters kept by a [`FrameParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Frames that passed the checksum and were emitted.
    pub frames_accepted: u64,
    /// Complete frames dropped because the checksum did not match.
    pub checksum_mismatches: u64,
    /// Bytes skipped while searching for a header.
    pub bytes_discarded: u64,
}

/// Incremental, resynchronizing frame parser.
///
/// Feed it one byte at a time, at any pace. Every byte in every state has a
/// defined transition, so corrupt input only ever costs the frame it hit:
/// the parser falls back to hunting for the next header.
///
/// ```
/// use xelink_frame::{encode, FrameParser};
///
/// let wire = encode(0x01, b"hi").unwrap();
/// let mut parser = FrameParser::new();
/// let frames = parser.feed_slice(&wire);
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].payload.as_ref(), b"hi");
/// ```
#[derive(Debug)]
pub struct FrameParser {
    state: ParserState,
    buf: Vec<u8>,
    msg_type: u8,
    payload_len: usize,
    stats: ParserStats,
}

impl FrameParser {
    /// Create a parser waiting for the first header byte.
    pub fn new() -> Self {
        Self {
            state: ParserState::AwaitHeader1,
            buf: Vec::with_capacity(BUFFER_CAPACITY),
            msg_type: 0,
            payload_len: 0,
            stats: ParserStats::default(),
        }
    }

    /// Consume one byte. Returns a frame when this byte completes a valid one.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            ParserState::AwaitHeader1 => {
                if byte == HEADER_1 {
                    self.state = ParserState::AwaitHeader2;
                } else {
                    self.stats.bytes_discarded += 1;
                }
            }
            ParserState::AwaitHeader2 => {
                if byte == HEADER_2 {
                    self.buf.clear();
                    self.state = ParserState::ReadType;
                } else if byte == HEADER_1 {
                    // The earlier HEADER_1 was noise; this one may start a real frame.
                    self.stats.bytes_discarded += 1;
                } else {
                    self.stats.bytes_discarded += 2;
                    self.state = ParserState::AwaitHeader1;
                }
            }
            ParserState::ReadType => {
                self.msg_type = byte;
                self.buf.push(byte);
                self.state = ParserState::ReadLength;
            }
            ParserState::ReadLength => {
                self.payload_len = usize::from(byte);
                self.buf.push(byte);
                self.state = if self.payload_len == 0 {
                    ParserState::ReadChecksum
                } else {
                    ParserState::ReadPayload
                };
            }
            ParserState::ReadPayload => {
                self.buf.push(byte);
                if self.buf.len() == self.payload_len + 2 {
                    self.state = ParserState::ReadChecksum;
                }
            }
            ParserState::ReadChecksum => {
                self.state = ParserState::AwaitHeader1;
                return self.finish(byte);
            }
        }
        None
    }

    /// Feed every byte of `bytes`, collecting the frames they complete.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&byte| self.feed(byte)).collect()
    }

    /// Abandon any partial frame and go back to hunting for a header.
    pub fn reset(&mut self) {
        self.state = ParserState::AwaitHeader1;
        self.buf.clear();
        self.msg_type = 0;
        self.payload_len = 0;
    }

    /// Current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// True while hunting for the first header byte.
    pub fn is_idle(&self) -> bool {
        self.state == ParserState::AwaitHeader1
    }

    /// True once a full header was seen and the frame is not finished yet.
    pub fn is_mid_frame(&self) -> bool {
        !matches!(
            self.state,
            ParserState::AwaitHeader1 | ParserState::AwaitHeader2
        )
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    fn finish(&mut self, received: u8) -> Option<Frame> {
        let expected = checksum(&self.buf);
        if expected != received {
            self.stats.checksum_mismatches += 1;
            debug!(
                msg_type = self.msg_type,
                len = self.payload_len,
                expected,
                received,
                "dropping frame: checksum mismatch"
            );
            return None;
        }

        self.stats.frames_accepted += 1;
        Some(Frame {
            msg_type: self.msg_type,
            payload: Bytes::copy_from_slice(&self.buf[2..]),
        })
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
