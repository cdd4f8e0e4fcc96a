use serde::{Deserialize, Serialize};

use portlink_frame::{CharsetMode, SentinelCode};
use portlink_transport::{DataBits, Parity, PortConfig, StopBits, DEFAULT_BAUD_RATE};

use crate::error::{LinkError, Result};

/// Default start code string (ENQ).
pub const DEFAULT_START_CODE: &str = "0x05";
/// Default end code string (CR).
pub const DEFAULT_END_CODE: &str = "0x0D";
/// Default charset label.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// User-facing configuration of one connection, in the raw string and
/// numeric form it is persisted and edited in.
///
/// [`resolve`](ConnConfig::resolve) validates it into the transport and
/// framing settings the connection actually runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnConfig {
    /// Unique name of the connection within its link.
    pub name: String,
    /// System port name.
    pub port: String,
    pub baud_rate: u32,
    /// 5 through 8.
    pub data_bits: u8,
    /// 1 or 2.
    pub stop_bits: u8,
    /// 0 none, 1 odd, 2 even.
    pub parity: u8,
    /// Start sentinel string: hex (`0x` prefix), decimal, or charset
    /// fallback.
    pub start_code: String,
    /// End sentinel string, same forms as the start code.
    pub end_code: String,
    /// Charset label, or `"None"` for raw hex mode.
    pub charset: String,
}

impl ConnConfig {
    /// Configuration for `name` on `port` with the stock defaults:
    /// 9600 8N1, ENQ/CR sentinels, UTF-8.
    pub fn new(name: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            parity: 0,
            start_code: DEFAULT_START_CODE.to_string(),
            end_code: DEFAULT_END_CODE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the data bits (5 through 8).
    pub fn with_data_bits(mut self, data_bits: u8) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Set the stop bits (1 or 2).
    pub fn with_stop_bits(mut self, stop_bits: u8) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set the parity (0 none, 1 odd, 2 even).
    pub fn with_parity(mut self, parity: u8) -> Self {
        self.parity = parity;
        self
    }

    /// Set the start code string.
    pub fn with_start_code(mut self, start_code: impl Into<String>) -> Self {
        self.start_code = start_code.into();
        self
    }

    /// Set the end code string.
    pub fn with_end_code(mut self, end_code: impl Into<String>) -> Self {
        self.end_code = end_code.into();
        self
    }

    /// Set the charset label.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Validate and resolve into runtime settings.
    ///
    /// Has no side effects, so a failing edit leaves whatever used the
    /// previous configuration untouched.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let charset = CharsetMode::parse(&self.charset)?;
        let start = SentinelCode::parse(&self.start_code, charset)?;
        let end = SentinelCode::parse(&self.end_code, charset)?;

        let data_bits =
            DataBits::from_raw(self.data_bits).ok_or(LinkError::InvalidLineParameter {
                field: "data bits",
                value: self.data_bits as u32,
            })?;
        let stop_bits =
            StopBits::from_raw(self.stop_bits).ok_or(LinkError::InvalidLineParameter {
                field: "stop bits",
                value: self.stop_bits as u32,
            })?;
        let parity = Parity::from_raw(self.parity).ok_or(LinkError::InvalidLineParameter {
            field: "parity",
            value: self.parity as u32,
        })?;

        Ok(ResolvedConfig {
            port: PortConfig {
                port: self.port.clone(),
                baud_rate: self.baud_rate,
                data_bits,
                stop_bits,
                parity,
            },
            start,
            end,
            charset,
        })
    }
}

/// Validated runtime settings derived from a [`ConnConfig`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Line parameters handed to the driver.
    pub port: PortConfig,
    /// Inbound framing and default outbound start sentinel.
    pub start: SentinelCode,
    /// Inbound framing and default outbound end sentinel.
    pub end: SentinelCode,
    /// Payload text conversion mode.
    pub charset: CharsetMode,
}
