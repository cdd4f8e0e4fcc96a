use std::fmt;

use crate::charset::CharsetMode;
use crate::error::{FrameError, Result};

/// A single frame delimiter byte.
///
/// Parsed from a configuration string that may be hex (`0x` prefix) or
/// decimal; a string that is neither resolves to the first byte of its
/// encoding under the connection's charset. Numeric strings that do not fit
/// in one byte are parse errors, never silent truncations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelCode(u8);

impl SentinelCode {
    /// Wrap a raw delimiter byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The delimiter byte.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Parse a sentinel string. `charset` supplies the fallback encoding for
    /// non-numeric strings; raw hex mode has no such fallback.
    pub fn parse(input: &str, charset: CharsetMode) -> Result<Self> {
        let parse_err = || FrameError::SentinelParse {
            input: input.to_string(),
        };

        if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            let value = u8::from_str_radix(hex, 16).map_err(|_| parse_err())?;
            return Ok(Self(value));
        }

        // Digit-only strings are decimal; out-of-range is an error rather
        // than a fall-through to the charset rule.
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            let value = input.parse::<u8>().map_err(|_| parse_err())?;
            return Ok(Self(value));
        }

        match charset {
            CharsetMode::None => Err(parse_err()),
            mode => {
                let encoded = mode.encode(input).map_err(|_| parse_err())?;
                let first = encoded.first().copied().ok_or_else(parse_err)?;
                Ok(Self(first))
            }
        }
    }
}

impl fmt::Display for SentinelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}
