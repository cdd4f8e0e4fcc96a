//! Serial port transport abstraction.
//!
//! The narrow seam the rest of portlink drives ports through:
//! [`PortDriver`] opens ports and enumerates the system, [`PortHandle`] is
//! one open port, read a byte at a time. [`SystemDriver`] talks to real
//! devices via the `serialport` crate; [`MockDriver`] is the scripted
//! in-memory driver used by tests and demos.

pub mod config;
pub mod error;
pub mod mock;
pub mod system;
pub mod traits;

pub use config::{DataBits, Parity, PortConfig, StopBits, DEFAULT_BAUD_RATE};
pub use error::{Result, TransportError};
pub use mock::{MockDriver, MockPortScript};
pub use system::SystemDriver;
pub use traits::{PortDriver, PortHandle, PortInfo, PortKind};
