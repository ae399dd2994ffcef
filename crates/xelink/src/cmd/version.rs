use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("xelink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: xelink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("XELINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("XELINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "serial: {}",
        if cfg!(unix) { "termios" } else { "unavailable" }
    );
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );
    println!(
        "protocol: header=AB CD, max_payload={}, crc=CRC-8/MAXIM",
        xelink_frame::MAX_PAYLOAD_SIZE
    );

    Ok(SUCCESS)
}
