use xelink_frame::encode;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (msg_type, payload) = args.payload.resolve()?;
    let wire = encode(msg_type, &payload).map_err(|err| frame_error("encode failed", err))?;

    print_encoded(msg_type, payload.len(), &wire, format);
    Ok(SUCCESS)
}
