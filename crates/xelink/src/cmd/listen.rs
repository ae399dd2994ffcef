use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use xelink_dispatch::{DispatchError, HandlerRegistry};
use xelink_frame::{Frame, FrameConfig, FrameReader};
use xelink_transport::{SerialConfig, SerialPort};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{dispatch_error, frame_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let read_timeout = parse_duration(&args.read_timeout)?;
    let config = SerialConfig {
        baud_rate: args.serial.baud,
        read_timeout,
    };
    let port = SerialPort::open(&args.serial.device, &config)
        .map_err(|err| transport_error("open failed", err))?;
    let mut reader = FrameReader::with_config_serial(
        port,
        FrameConfig {
            read_timeout: Some(read_timeout),
        },
    )
    .map_err(|err| frame_error("configure failed", err))?;

    let mut registry = position_registry()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.poll_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        if !accept_frame(&mut registry, &frame, args.types.as_deref())? {
            continue;
        }

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = reader.stats();
    info!(
        frames_printed = printed,
        frames_accepted = stats.frames_accepted,
        checksum_mismatches = stats.checksum_mismatches,
        bytes_discarded = stats.bytes_discarded,
        "listener stopped"
    );
    Ok(SUCCESS)
}

fn position_registry() -> CliResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry
        .register_position(|position| {
            debug!(
                x = position.x,
                y = position.y,
                z = position.z,
                "position report"
            );
        })
        .map_err(|err| dispatch_error("handler setup failed", err))?;
    Ok(registry)
}

/// Run the frame through the registry and the type filter.
///
/// Frames whose length does not match their registered type are dropped.
fn accept_frame(
    registry: &mut HandlerRegistry,
    frame: &Frame,
    types: Option<&[u8]>,
) -> CliResult<bool> {
    if let Some(types) = types {
        if !types.contains(&frame.msg_type) {
            return Ok(false);
        }
    }

    match registry.dispatch(frame) {
        Ok(_) => Ok(true),
        Err(DispatchError::LengthMismatch { .. }) => Ok(false),
        Err(err) => Err(dispatch_error("dispatch failed", err)),
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
