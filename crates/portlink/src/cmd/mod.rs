use clap::{Args, Subcommand};

use portlink_conn::{ConnConfig, DEFAULT_CHARSET, DEFAULT_END_CODE, DEFAULT_START_CODE};
use portlink_transport::DEFAULT_BAUD_RATE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod ports;
pub mod send;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the serial ports visible on this system.
    Ports(PortsArgs),
    /// Open a port and print each framed value until interrupted.
    Watch(WatchArgs),
    /// Open a port, send one framed message, and disconnect.
    Send(SendArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Send(args) => send::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0, COM3).
    #[arg(long)]
    pub port: String,
    /// Connection name used in output and logs.
    #[arg(long, default_value = "watch")]
    pub name: String,
    /// Exit after printing N values.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0, COM3).
    #[arg(long)]
    pub port: String,
    /// Message to frame and send, interpreted under the charset.
    #[arg(long, short = 'm')]
    pub message: String,
    #[command(flatten)]
    pub line: LineArgs,
}

/// Line settings and framing rules shared by the connecting commands.
#[derive(Args, Debug)]
pub struct LineArgs {
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Data bits per character (5 to 8).
    #[arg(long, default_value_t = 8)]
    pub data_bits: u8,
    /// Stop bits (1 or 2).
    #[arg(long, default_value_t = 1)]
    pub stop_bits: u8,
    /// Parity (0 none, 1 odd, 2 even).
    #[arg(long, default_value_t = 0)]
    pub parity: u8,
    /// Frame start sentinel: hex (0x05), decimal, or one charset character.
    #[arg(long, default_value = DEFAULT_START_CODE)]
    pub start_code: String,
    /// Frame end sentinel: hex (0x0D), decimal, or one charset character.
    #[arg(long, default_value = DEFAULT_END_CODE)]
    pub end_code: String,
    /// Charset label, or "None" to treat payloads as raw hex.
    #[arg(long, default_value = DEFAULT_CHARSET)]
    pub charset: String,
}

impl LineArgs {
    pub fn to_config(&self, name: &str, port: &str) -> ConnConfig {
        ConnConfig::new(name, port)
            .with_baud_rate(self.baud)
            .with_data_bits(self.data_bits)
            .with_stop_bits(self.stop_bits)
            .with_parity(self.parity)
            .with_start_code(self.start_code.clone())
            .with_end_code(self.end_code.clone())
            .with_charset(self.charset.clone())
    }
}
