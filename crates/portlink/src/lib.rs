//! Sentinel-framed serial port connectors.
//!
//! portlink manages named serial connections whose byte streams are framed
//! by configurable start and end sentinels, decoded through a configurable
//! charset, and polled on a fixed cadence.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial port abstraction (system ports, scripted mocks)
//! - [`frame`] — Sentinel frame assembly, charset codecs, sentinel parsing
//! - [`conn`] — Managed connections with polling and lifecycle events
//!   (behind the `conn` feature)

/// Re-export transport types.
pub mod transport {
    pub use portlink_transport::*;
}

/// Re-export framing types.
pub mod frame {
    pub use portlink_frame::*;
}

/// Re-export connection management types (requires `conn` feature).
#[cfg(feature = "conn")]
pub mod conn {
    pub use portlink_conn::*;
}
