/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: std::io::Error,
    },

    /// Failed to enumerate the system's serial ports.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] std::io::Error),

    /// An I/O error occurred on an open port.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The port has been closed.
    #[error("port closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
