//! Async loopback over an in-memory duplex pipe using `XeCodec`.
//!
//! Run with:
//!   cargo run --example async-loopback --features async

use futures_util::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use xelink::frame::{Frame, MessageType, Position, XeCodec};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = tokio::io::duplex(256);

    let sender = tokio::spawn(async move {
        let mut sink = FramedWrite::new(tx, XeCodec::new());
        for step in 0..3u8 {
            let t = f32::from(step);
            let payload = Position::new(t, t + 0.5, t * 10.0).to_payload();
            sink.send(Frame::new(MessageType::Position.as_u8(), payload.to_vec()))
                .await?;
        }
        Ok::<_, xelink::frame::FrameError>(())
    });

    let mut stream = FramedRead::new(rx, XeCodec::new());
    while let Some(frame) = stream.next().await {
        let frame = frame?;
        let position = Position::from_payload(&frame.payload)?;
        eprintln!(
            "[rx] position x={} y={} z={}",
            position.x, position.y, position.z
        );
    }

    sender.await??;
    Ok(())
}
