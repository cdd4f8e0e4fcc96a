//! Sentinel-delimited framing for serial byte streams.
//!
//! Inbound bytes pass through the [`FrameAssembler`], a two-state machine
//! that discards noise until a start sentinel and collects payload bytes
//! until the end sentinel. Payloads convert to and from message text via
//! [`CharsetMode`]; [`SentinelCode`] parses the configurable delimiter
//! bytes; [`encode_frame`] wraps outbound payloads for the wire.

pub mod assembler;
pub mod charset;
pub mod error;
pub mod sentinel;

pub use assembler::{encode_frame, FrameAssembler, DEFAULT_MAX_PAYLOAD};
pub use charset::{hex_string, parse_hex_tokens, CharsetMode, NONE_LABEL};
pub use error::{FrameError, Result};
pub use sentinel::SentinelCode;
