use std::fs;
use std::io::Read;

use tracing::{info, warn};
use xelink_frame::{Frame, FrameParser, ParserStats};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;
    let (frames, stats, truncated) = decode_all(&input);

    for frame in &frames {
        print_frame(frame, format);
    }

    if truncated {
        warn!("input ended in the middle of a frame");
    }
    info!(
        input_bytes = input.len(),
        frames = stats.frames_accepted,
        checksum_mismatches = stats.checksum_mismatches,
        bytes_discarded = stats.bytes_discarded,
        "decode finished"
    );

    if frames.is_empty() && args.strict {
        return Err(CliError::new(DATA_INVALID, "no valid frame found in input"));
    }
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(input)
}

fn decode_all(input: &[u8]) -> (Vec<Frame>, ParserStats, bool) {
    let mut parser = FrameParser::new();
    let frames = parser.feed_slice(input);
    (frames, parser.stats(), parser.is_mid_frame())
}
