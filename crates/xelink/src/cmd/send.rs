use tracing::info;
use xelink_frame::{type_name, FrameWriter};
use xelink_transport::{SerialConfig, SerialPort};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let (msg_type, payload) = args.payload.resolve()?;

    let config = SerialConfig {
        baud_rate: args.serial.baud,
        ..SerialConfig::default()
    };
    let port = SerialPort::open(&args.serial.device, &config)
        .map_err(|err| transport_error("open failed", err))?;

    let mut writer = FrameWriter::new(port);
    writer
        .send(msg_type, &payload)
        .map_err(|err| frame_error("send failed", err))?;

    info!(
        device = %args.serial.device.display(),
        msg_type,
        type_name = type_name(msg_type),
        len = payload.len(),
        "frame sent"
    );
    Ok(SUCCESS)
}
