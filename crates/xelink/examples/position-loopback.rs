//! Position loopback: frames written into a noisy byte buffer and recovered.
//!
//! Run with:
//!   cargo run --example position-loopback

use std::io::Cursor;

use xelink::dispatch::{HandlerRegistry, PayloadLength};
use xelink::frame::{FrameError, FrameReader, FrameWriter, Position};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = FrameWriter::new(Vec::<u8>::new());

    // Line noise before the first frame.
    writer.get_mut().extend_from_slice(&[0x00, 0xAB, 0x5A, 0xFF]);
    for step in 0..4u8 {
        let t = f32::from(step);
        writer.send_position(&Position::new(t, t * 2.0, -t))?;
    }
    writer.send(0x20, b"status: ok")?;

    // Flip one payload bit of the second position frame.
    let mut link = writer.into_inner();
    link[4 + 17 + 6] ^= 0x01;

    let mut registry = HandlerRegistry::new();
    registry.register_position(|p| eprintln!("[rx] position x={} y={} z={}", p.x, p.y, p.z))?;
    registry.register(0x20, PayloadLength::Any, |payload| {
        eprintln!("[rx] status {}", String::from_utf8_lossy(payload));
        Ok(())
    })?;

    let mut reader = FrameReader::new(Cursor::new(link));
    loop {
        match reader.read_frame() {
            Ok(frame) => {
                registry.dispatch(&frame)?;
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let stats = reader.stats();
    eprintln!(
        "[rx] accepted={} checksum_mismatches={} bytes_discarded={}",
        stats.frames_accepted, stats.checksum_mismatches, stats.bytes_discarded
    );
    Ok(())
}
