use std::fmt;

use portlink_conn::LinkError;
use portlink_frame::FrameError;
use portlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const USAGE: i32 = 2;
pub const CONFIG_INVALID: i32 = 10;
pub const OPEN_FAILED: i32 = 11;
pub const IO_ERROR: i32 = 12;
pub const UNKNOWN_TARGET: i32 = 13;
pub const INTERNAL: i32 = 70;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Open { .. } => OPEN_FAILED,
        TransportError::Enumerate(_) | TransportError::Io(_) | TransportError::Closed => IO_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(CONFIG_INVALID, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    match err {
        LinkError::Transport(err) => transport_error(context, err),
        LinkError::Frame(err) => frame_error(context, err),
        LinkError::InvalidLineParameter { .. } => {
            CliError::new(CONFIG_INVALID, format!("{context}: {err}"))
        }
        LinkError::UnknownConn(_) => CliError::new(UNKNOWN_TARGET, format!("{context}: {err}")),
        LinkError::DuplicateConn(_) => CliError::new(USAGE, format!("{context}: {err}")),
        LinkError::NotConnected => CliError::new(IO_ERROR, format!("{context}: {err}")),
    }
}
