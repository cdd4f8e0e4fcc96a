use std::fmt;

use serde::Serialize;

use crate::config::PortConfig;
use crate::error::Result;

/// An open serial port.
///
/// Ports are driven one byte at a time: callers check [`bytes_to_read`] and
/// only then call [`read_byte`], so a well-behaved caller never waits on
/// bytes that have not arrived.
///
/// [`bytes_to_read`]: PortHandle::bytes_to_read
/// [`read_byte`]: PortHandle::read_byte
pub trait PortHandle: Send {
    /// Number of bytes currently buffered for reading (non-blocking).
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Read exactly one byte.
    fn read_byte(&mut self) -> Result<u8>;

    /// Write the whole buffer and flush it to the device.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Release the port. Failures are reported so callers can log them; the
    /// handle is consumed either way.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens serial ports and enumerates the system.
///
/// [`SystemDriver`](crate::SystemDriver) talks to real devices;
/// [`MockDriver`](crate::MockDriver) is the scripted in-memory equivalent.
pub trait PortDriver: Send + Sync {
    /// Open a port with the given line parameters.
    fn open(&self, config: &PortConfig) -> Result<Box<dyn PortHandle>>;

    /// List the ports currently known to the system.
    fn list_ports(&self) -> Result<Vec<PortInfo>>;
}

/// A serial port reported by [`PortDriver::list_ports`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// System name of the port.
    pub name: String,
    /// Coarse hardware type.
    pub kind: PortKind,
    /// USB manufacturer string, when the platform exposes one.
    pub manufacturer: Option<String>,
    /// USB product string, when the platform exposes one.
    pub product: Option<String>,
}

/// Coarse hardware type of an enumerated port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortKind::Usb => "USB",
            PortKind::Pci => "PCI",
            PortKind::Bluetooth => "Bluetooth",
            PortKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}
