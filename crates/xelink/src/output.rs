use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xelink_frame::{type_name, Frame, MessageType, Position};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PositionOutput {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    msg_type: u8,
    type_name: &'a str,
    payload_size: usize,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<PositionOutput>,
    timestamp: String,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    msg_type: u8,
    type_name: &'a str,
    payload_size: usize,
    frame_size: usize,
    frame: String,
}

/// Print one received frame.
pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let name = type_name(frame.msg_type);
    let position = decode_position(frame);

    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                msg_type: frame.msg_type,
                type_name: name,
                payload_size: frame.payload.len(),
                payload: format_hex(frame.payload.as_ref()),
                position: position.map(|p| PositionOutput {
                    x: p.x,
                    y: p.y,
                    z: p.z,
                }),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "NAME", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{:#04x}", frame.msg_type),
                    name.to_string(),
                    frame.payload.len().to_string(),
                    payload_preview(frame, position),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={:#04x} ({}) size={} {}",
                frame.msg_type,
                name,
                frame.payload.len(),
                payload_preview(frame, position)
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

/// Print an encoded frame ready for the wire.
pub fn print_encoded(msg_type: u8, payload_size: usize, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                msg_type,
                type_name: type_name(msg_type),
                payload_size,
                frame_size: wire.len(),
                frame: format_hex(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "NAME", "SIZE", "FRAME"])
                .add_row(vec![
                    format!("{msg_type:#04x}"),
                    type_name(msg_type).to_string(),
                    wire.len().to_string(),
                    format_hex(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", format_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Upper-case hex, one space between bytes.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_position(frame: &Frame) -> Option<Position> {
    match frame.message_type() {
        Some(MessageType::Position) => Position::from_payload(frame.payload.as_ref()).ok(),
        _ => None,
    }
}

fn payload_preview(frame: &Frame, position: Option<Position>) -> String {
    match position {
        Some(p) => format!("x={} y={} z={}", p.x, p.y, p.z),
        None if frame.payload.is_empty() => "<empty>".to_string(),
        None => format_hex(frame.payload.as_ref()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
