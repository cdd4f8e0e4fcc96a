use std::fmt;

use serde::Serialize;

/// Lifecycle state of a connection, published on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnStatus {
    /// Created or reconfigured; the first connect attempt has not finished.
    Initializing,
    /// The port is open.
    Connected,
    /// The port was closed on request.
    Disconnected,
    /// The last connect attempt failed; connect remains available.
    FailedToConnect,
}

impl ConnStatus {
    /// The published status string.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnStatus::Initializing => "Initializing",
            ConnStatus::Connected => "Connected",
            ConnStatus::Disconnected => "Disconnected",
            ConnStatus::FailedToConnect => "Failed to Connect",
        }
    }
}

impl fmt::Display for ConnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
