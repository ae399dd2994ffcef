use bytes::BytesMut;
use tracing::trace;
use xelink_transport::ByteSink;

use crate::codec::{encode_into, Frame, MAX_FRAME_SIZE};
use crate::error::Result;
use crate::message::{MessageType, Position};

/// Writes complete frames to any [`ByteSink`].
///
/// Each frame is encoded into a reusable buffer and handed to the sink in a
/// single `write_bytes` call, so a frame is never interleaved with another.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: ByteSink> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Write a complete frame.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.msg_type, frame.payload.as_ref())
    }

    /// Encode and send a payload with the given type tag.
    ///
    /// Oversized payloads are rejected before anything is written.
    pub fn send(&mut self, msg_type: u8, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_into(msg_type, payload, &mut self.buf)?;
        self.inner.write_bytes(&self.buf)?;
        trace!(msg_type, len = payload.len(), "frame sent");
        Ok(())
    }

    /// Encode and send a position report.
    pub fn send_position(&mut self, position: &Position) -> Result<()> {
        self.send(MessageType::Position.as_u8(), &position.to_payload())
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{encode, MAX_PAYLOAD_SIZE};
    use crate::error::FrameError;
    use crate::parser::FrameParser;

    fn decode_all(wire: &[u8]) -> Vec<Frame> {
        FrameParser::new().feed_slice(wire)
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(1, b"hello").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, encode(1, b"hello").unwrap());
        assert_eq!(decode_all(&wire), vec![Frame::new(1, &b"hello"[..])]);
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());

        writer.send(1, b"one").unwrap();
        writer.send(2, b"two").unwrap();
        writer.send(3, b"three").unwrap();

        let frames = decode_all(writer.get_ref());
        assert_eq!(frames.len(), 3);
        assert_eq!((frames[0].msg_type, frames[0].payload.as_ref()), (1, b"one".as_ref()));
        assert_eq!((frames[1].msg_type, frames[1].payload.as_ref()), (2, b"two".as_ref()));
        assert_eq!(
            (frames[2].msg_type, frames[2].payload.as_ref()),
            (3, b"three".as_ref())
        );
    }

    #[test]
    fn payload_too_large_rejected_and_nothing_written() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());

        let err = writer.send(1, &[0u8; MAX_PAYLOAD_SIZE + 1]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 256, .. }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn max_payload_accepted() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(0x30, &[0xEE; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(writer.get_ref().len(), MAX_FRAME_SIZE);
    }

    #[test]
    fn write_frame_method() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        let frame = Frame::new(2, "abc");

        writer.write_frame(&frame).unwrap();

        assert_eq!(decode_all(writer.get_ref()), vec![frame]);
    }

    #[test]
    fn send_position_matches_reference_bytes() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send_position(&Position::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(
            writer.into_inner(),
            [
                0xAB, 0xCD, 0x01, 0x0C, 0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x40, 0x00,
                0x00, 0x40, 0x40, 0x7C
            ]
        );
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(1, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_and_would_block_writes() {
        let sink = HiccupWriter {
            hiccups: vec![ErrorKind::WouldBlock, ErrorKind::Interrupted],
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(sink);
        writer.send(5, b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(decode_all(&inner.data), vec![Frame::new(5, &b"retry"[..])]);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct HiccupWriter {
        hiccups: Vec<ErrorKind>,
        data: Vec<u8>,
    }

    impl Write for HiccupWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.hiccups.pop() {
                return Err(std::io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
