use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use xelink_frame::{MessageType, Position};

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
#[cfg(unix)]
pub mod listen;
#[cfg(unix)]
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a frame and print it.
    Encode(EncodeArgs),
    /// Parse frames out of a byte stream.
    Decode(DecodeArgs),
    /// Send a single frame to a serial device.
    #[cfg(unix)]
    Send(SendArgs),
    /// Listen on a serial device and print received frames.
    #[cfg(unix)]
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        #[cfg(unix)]
        Command::Send(args) => send::run(args),
        #[cfg(unix)]
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Type tag and payload shared by `encode` and `send`.
#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Message type tag (decimal or 0x-prefixed hex).
    #[arg(long = "type", short = 't', value_name = "TAG", value_parser = parse_tag)]
    pub msg_type: Option<u8>,
    /// Payload as hex bytes (whitespace and ':' separators allowed).
    #[arg(long, conflicts_with_all = ["data", "position"])]
    pub hex: Option<String>,
    /// Payload as a UTF-8 string.
    #[arg(long, conflicts_with_all = ["hex", "position"])]
    pub data: Option<String>,
    /// Position report payload (type 0x01).
    #[arg(
        long,
        value_name = "X,Y,Z",
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with_all = ["hex", "data"]
    )]
    pub position: Option<Vec<f32>>,
}

impl PayloadArgs {
    /// Resolve the type tag and payload bytes.
    pub fn resolve(&self) -> CliResult<(u8, Vec<u8>)> {
        if let Some(components) = &self.position {
            let position_tag = MessageType::Position.as_u8();
            if let Some(tag) = self.msg_type.filter(|tag| *tag != position_tag) {
                return Err(CliError::usage(format!(
                    "--position requires type {position_tag:#04x}, got {tag:#04x}"
                )));
            }
            let [x, y, z] = components.as_slice() else {
                return Err(CliError::usage(format!(
                    "--position takes exactly 3 components, got {}",
                    components.len()
                )));
            };
            return Ok((position_tag, Position::new(*x, *y, *z).to_payload().to_vec()));
        }

        let msg_type = self
            .msg_type
            .ok_or_else(|| CliError::usage("--type is required unless --position is given"))?;

        if let Some(hex) = &self.hex {
            return Ok((msg_type, parse_hex(hex)?));
        }
        if let Some(data) = &self.data {
            return Ok((msg_type, data.as_bytes().to_vec()));
        }
        Ok((msg_type, Vec::new()))
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input as hex bytes.
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw input bytes from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Fail when the input contains no valid frame.
    #[arg(long)]
    pub strict: bool,
}

/// Serial device selection shared by `send` and `listen`.
#[cfg(unix)]
#[derive(Args, Debug)]
pub struct SerialArgs {
    /// Serial device path.
    #[arg(env = "XELINK_DEVICE")]
    pub device: PathBuf,
    /// Line speed in bits per second.
    #[arg(long, env = "XELINK_BAUD", default_value_t = xelink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[cfg(unix)]
#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[cfg(unix)]
#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    /// Only print these type tags (comma-separated).
    #[arg(long, value_delimiter = ',', value_parser = parse_tag)]
    pub types: Option<Vec<u8>>,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// How long one read waits for a byte (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub read_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_tag(input: &str) -> Result<u8, String> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| format!("invalid type tag '{input}' (expected 0..=255 or 0x00..=0xFF)"))
}

pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::usage(format!("invalid hex input: {input}")));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::usage("hex input has an odd number of digits"));
    }

    (0..digits.len())
        .step_by(2)
        .map(|at| {
            u8::from_str_radix(&digits[at..at + 2], 16)
                .map_err(|_| CliError::usage(format!("invalid hex input: {input}")))
        })
        .collect()
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
