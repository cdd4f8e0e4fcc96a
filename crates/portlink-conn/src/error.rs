/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] portlink_transport::TransportError),

    /// Sentinel, charset, or message encoding error.
    #[error("frame error: {0}")]
    Frame(#[from] portlink_frame::FrameError),

    /// A line parameter is outside what the hardware layer supports.
    #[error("unsupported {field}: {value}")]
    InvalidLineParameter { field: &'static str, value: u32 },

    /// No connection registered under this name.
    #[error("no connection named {0:?}")]
    UnknownConn(String),

    /// A connection with this name already exists.
    #[error("connection {0:?} already exists")]
    DuplicateConn(String),

    /// The operation requires an open port.
    #[error("port is not open")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, LinkError>;
