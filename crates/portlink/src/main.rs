mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "portlink", version, about = "Sentinel-framed serial connector CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        global = true,
        env = "PORTLINK_LOG"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
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
    fn parses_watch_subcommand() {
        let cli = Cli::try_parse_from([
            "portlink",
            "watch",
            "--port",
            "/dev/ttyUSB0",
            "--baud",
            "115200",
            "--charset",
            "ascii",
        ])
        .expect("watch args should parse");

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.port, "/dev/ttyUSB0");
                assert_eq!(args.line.baud, 115_200);
                assert_eq!(args.line.charset, "ascii");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn watch_defaults_cover_framing() {
        let cli = Cli::try_parse_from(["portlink", "watch", "--port", "COM3"])
            .expect("watch args should parse");

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.line.baud, 9600);
                assert_eq!(args.line.start_code, "0x05");
                assert_eq!(args.line.end_code, "0x0D");
                assert_eq!(args.line.charset, "UTF-8");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "portlink",
            "send",
            "--port",
            "COM3",
            "--message",
            "hello",
            "--start-code",
            "0x02",
            "--end-code",
            "0x03",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.message, "hello");
                assert_eq!(args.line.start_code, "0x02");
                assert_eq!(args.line.end_code, "0x03");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn send_requires_a_message() {
        let err = Cli::try_parse_from(["portlink", "send", "--port", "COM3"])
            .expect_err("missing message should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn global_format_flag_applies_anywhere() {
        let cli = Cli::try_parse_from(["portlink", "ports", "--format", "json"])
            .expect("ports args should parse");
        assert!(matches!(cli.command, Command::Ports(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
