use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_into, Frame};
use crate::error::{FrameError, Result};
use crate::parser::{FrameParser, ParserStats};

/// `tokio_util` codec over the same resynchronizing parser used by
/// [`FrameReader`](crate::FrameReader).
///
/// Use with `FramedRead`, `FramedWrite` or `Framed` on any async byte stream.
#[derive(Debug, Default)]
pub struct XeCodec {
    parser: FrameParser,
}

impl XeCodec {
    /// Create a codec with a fresh parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser diagnostic counters.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }
}

impl Decoder for XeCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let mut consumed = 0usize;
        let mut decoded = None;
        for &byte in src.iter() {
            consumed += 1;
            if let Some(frame) = self.parser.feed(byte) {
                decoded = Some(frame);
                break;
            }
        }
        // Bytes fed to the parser live on in its own buffer.
        src.advance(consumed);
        Ok(decoded)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if self.parser.is_mid_frame() {
            self.parser.reset();
            return Err(FrameError::IncompleteFrame);
        }
        Ok(None)
    }
}

impl Encoder<Frame> for XeCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        encode_into(item.msg_type, item.payload.as_ref(), dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codec::encode;
    use crate::message::{MessageType, Position};

    #[test]
    fn decode_across_split_buffers() {
        let wire = encode(0x11, b"split").unwrap();
        let mut codec = XeCodec::new();
        let mut buf = BytesMut::from(&wire[..4]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(&wire[4..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::new(0x11, &b"split"[..]));
    }

    #[test]
    fn decode_leaves_following_frame_in_buffer() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode(1, b"a").unwrap());
        buf.extend_from_slice(&encode(2, b"b").unwrap());

        let mut codec = XeCodec::new();
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.msg_type, 1);
        assert_eq!(buf.len(), 6);

        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.msg_type, 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let mut codec = XeCodec::new();
        let mut dst = BytesMut::new();
        let err = codec
            .encode(Frame::new(1, vec![0u8; 256]), &mut dst)
            .unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, XeCodec::new());
        let mut stream = FramedRead::new(server, XeCodec::new());

        let position = Position::new(1.0, 2.0, 3.0);
        sink.send(Frame::new(
            MessageType::Position.as_u8(),
            position.to_payload().to_vec(),
        ))
        .await
        .unwrap();
        sink.send(Frame::new(0x7F, vec![0x42; 255])).await.unwrap();
        drop(sink);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.message_type(), Some(MessageType::Position));
        assert_eq!(Position::from_payload(&first.payload).unwrap(), position);

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.payload.len(), 255);

        assert!(stream.next().await.is_none());
        assert_eq!(stream.decoder().stats().frames_accepted, 2);
    }

    #[tokio::test]
    async fn framed_skips_noise_and_reports_truncation() {
        let (mut client, server) = tokio::io::duplex(256);
        let mut stream = FramedRead::new(server, XeCodec::new());

        let good = encode(3, b"ok").unwrap();
        let truncated = encode(4, b"never-finished").unwrap();
        client.write_all(&[0x00, 0xFF, 0xAB, 0x01]).await.unwrap();
        client.write_all(&good).await.unwrap();
        client.write_all(&truncated[..7]).await.unwrap();
        drop(client);

        let frame = stream.next().await.unwrap().unwrap();
        assert_eq!(frame, Frame::new(3, &b"ok"[..]));

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, FrameError::IncompleteFrame));
    }
}
