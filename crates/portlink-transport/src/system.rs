use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{DataBits, Parity, PortConfig, StopBits};
use crate::error::{Result, TransportError};
use crate::traits::{PortDriver, PortHandle, PortInfo, PortKind};

/// Read timeout applied to opened ports.
///
/// Reads are gated on `bytes_to_read`, so the timeout only bounds a read
/// racing a device-side buffer flush.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Driver backed by the operating system's serial devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDriver;

impl SystemDriver {
    pub fn new() -> Self {
        Self
    }
}

impl PortDriver for SystemDriver {
    fn open(&self, config: &PortConfig) -> Result<Box<dyn PortHandle>> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(to_serialport_data_bits(config.data_bits))
            .stop_bits(to_serialport_stop_bits(config.stop_bits))
            .parity(to_serialport_parity(config.parity))
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| TransportError::Open {
                port: config.port.clone(),
                source: io::Error::other(e),
            })?;

        info!(
            port = %config.port,
            baud = config.baud_rate,
            data_bits = config.data_bits.as_raw(),
            stop_bits = config.stop_bits.as_raw(),
            parity = config.parity.as_raw(),
            "opened serial port"
        );

        Ok(Box::new(SystemPort {
            inner: port,
            name: config.port.clone(),
        }))
    }

    fn list_ports(&self) -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports()
            .map_err(|e| TransportError::Enumerate(io::Error::other(e)))?;
        debug!(count = ports.len(), "enumerated serial ports");
        Ok(ports.into_iter().map(port_info).collect())
    }
}

struct SystemPort {
    inner: Box<dyn serialport::SerialPort>,
    name: String,
}

impl PortHandle for SystemPort {
    fn bytes_to_read(&mut self) -> Result<usize> {
        let available = self
            .inner
            .bytes_to_read()
            .map_err(|e| TransportError::Io(io::Error::other(e)))?;
        Ok(available as usize)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.inner.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!(port = %self.name, "closing serial port");
        // Dropping the handle releases the device.
        Ok(())
    }
}

fn to_serialport_data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn to_serialport_stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn to_serialport_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn port_info(p: serialport::SerialPortInfo) -> PortInfo {
    let (kind, manufacturer, product) = match p.port_type {
        serialport::SerialPortType::UsbPort(usb) => (PortKind::Usb, usb.manufacturer, usb.product),
        serialport::SerialPortType::PciPort => (PortKind::Pci, None, None),
        serialport::SerialPortType::BluetoothPort => (PortKind::Bluetooth, None, None),
        serialport::SerialPortType::Unknown => (PortKind::Unknown, None, None),
    };
    PortInfo {
        name: p.port_name,
        kind,
        manufacturer,
        product,
    }
}
