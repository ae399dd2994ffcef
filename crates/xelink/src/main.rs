mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xelink", version, about = "Framed serial messaging CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);

    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_with_hex_tag() {
        let cli = Cli::try_parse_from(["xelink", "encode", "--type", "0x42", "--data", "ping"])
            .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.payload.msg_type, Some(0x42));
        assert_eq!(args.payload.data.as_deref(), Some("ping"));
    }

    #[test]
    fn parses_negative_position_components() {
        let cli = Cli::try_parse_from(["xelink", "encode", "--position", "-12.34,56.78,-90"])
            .expect("position args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.payload.position, Some(vec![-12.34, 56.78, -90.0]));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "xelink", "encode", "--type", "1", "--hex", "00", "--data", "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_out_of_range_tag() {
        let err = Cli::try_parse_from(["xelink", "encode", "--type", "256"])
            .expect_err("tag above 255 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[cfg(unix)]
    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from([
            "xelink",
            "listen",
            "/dev/ttyUSB0",
            "--baud",
            "57600",
            "--types",
            "1,0x10",
            "--count",
            "3",
        ])
        .expect("listen args should parse");

        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.serial.baud, 57_600);
        assert_eq!(args.types, Some(vec![0x01, 0x10]));
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "xelink",
            "decode",
            "--hex",
            "ABCD",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("global flags should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }
}
