//! Managed serial connections with sentinel framing.
//!
//! This is the "just works" layer. Register named connections, poll their
//! framed values on a fixed cadence, and push framed messages back out,
//! with lifecycle status events along the way.

pub mod config;
pub mod conn;
pub mod error;
pub mod link;
pub mod poller;
pub mod sink;
pub mod status;

pub use config::{
    ConnConfig, ResolvedConfig, DEFAULT_CHARSET, DEFAULT_END_CODE, DEFAULT_START_CODE,
};
pub use conn::{Conn, POLL_DELAY};
pub use error::{LinkError, Result};
pub use link::{CommandOutcome, LinkCommand, SerialLink};
pub use poller::PollTask;
pub use sink::{EventSink, LinkEvent, NullSink};
pub use status::ConnStatus;
