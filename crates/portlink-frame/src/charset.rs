use std::fmt;

use encoding_rs::Encoding;

use crate::error::{FrameError, Result};

/// The charset label selecting raw hex mode.
pub const NONE_LABEL: &str = "None";

/// How payload bytes and message text convert to one another.
///
/// `None` renders inbound payloads as space-separated lowercase hex octets
/// and parses outbound text as whitespace-separated hex byte tokens. A named
/// charset decodes and encodes under that encoding; a payload that is not
/// valid text under it falls back to the hex rendering on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetMode {
    /// Raw hex mode.
    None,
    /// A named text encoding.
    Named(&'static Encoding),
}

impl CharsetMode {
    /// Parse a charset label. The literal `"None"` (any case) selects raw
    /// hex mode; anything else must be a recognized encoding label.
    pub fn parse(label: &str) -> Result<Self> {
        if label.eq_ignore_ascii_case(NONE_LABEL) {
            return Ok(CharsetMode::None);
        }
        Encoding::for_label(label.as_bytes())
            .map(CharsetMode::Named)
            .ok_or_else(|| FrameError::UnknownCharset {
                label: label.to_string(),
            })
    }

    /// The canonical label for this mode.
    pub fn label(&self) -> &'static str {
        match self {
            CharsetMode::None => NONE_LABEL,
            CharsetMode::Named(encoding) => encoding.name(),
        }
    }

    /// Render payload bytes as message text. Never fails: a payload the
    /// charset cannot decode comes back as its hex rendering.
    pub fn decode(&self, payload: &[u8]) -> String {
        match self {
            CharsetMode::None => hex_string(payload),
            CharsetMode::Named(encoding) => {
                let (text, _, had_errors) = encoding.decode(payload);
                if had_errors {
                    hex_string(payload)
                } else {
                    text.into_owned()
                }
            }
        }
    }

    /// Encode message text as payload bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            CharsetMode::None => parse_hex_tokens(text),
            CharsetMode::Named(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    return Err(FrameError::Unencodable {
                        charset: encoding.name().to_string(),
                    });
                }
                Ok(bytes.into_owned())
            }
        }
    }
}

impl Default for CharsetMode {
    fn default() -> Self {
        CharsetMode::Named(encoding_rs::UTF_8)
    }
}

impl fmt::Display for CharsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render bytes as lowercase hex octets separated by single spaces.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse whitespace-separated hex byte tokens.
///
/// Every token must fit in one byte; zero tokens yield an empty payload.
pub fn parse_hex_tokens(text: &str) -> Result<Vec<u8>> {
    text.split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 16).map_err(|_| FrameError::HexToken {
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_none_label_any_case() {
        assert_eq!(CharsetMode::parse("None").unwrap(), CharsetMode::None);
        assert_eq!(CharsetMode::parse("none").unwrap(), CharsetMode::None);
        assert_eq!(CharsetMode::parse("NONE").unwrap(), CharsetMode::None);
    }

    #[test]
    fn parse_named_charset() {
        let mode = CharsetMode::parse("UTF-8").unwrap();
        assert_eq!(mode.label(), "UTF-8");
    }

    #[test]
    fn parse_unknown_label_fails() {
        let err = CharsetMode::parse("klingon-1").unwrap_err();
        assert!(matches!(err, FrameError::UnknownCharset { .. }));
    }

    #[test]
    fn decode_utf8_payload() {
        let mode = CharsetMode::parse("utf-8").unwrap();
        assert_eq!(mode.decode(b"hello"), "hello");
    }

    #[test]
    fn decode_invalid_utf8_falls_back_to_hex() {
        let mode = CharsetMode::parse("utf-8").unwrap();
        assert_eq!(mode.decode(&[0xff, 0x41, 0xfe]), "ff 41 fe");
    }

    #[test]
    fn decode_hex_mode() {
        assert_eq!(CharsetMode::None.decode(&[0x05, 0x0d, 0xa0]), "05 0d a0");
        assert_eq!(CharsetMode::None.decode(&[]), "");
    }

    #[test]
    fn encode_utf8_text() {
        let mode = CharsetMode::parse("utf-8").unwrap();
        assert_eq!(mode.encode("hi").unwrap(), b"hi".to_vec());
    }

    #[test]
    fn encode_unmappable_text_fails() {
        let mode = CharsetMode::parse("windows-1252").unwrap();
        let err = mode.encode("\u{55ca}").unwrap_err();
        assert!(matches!(err, FrameError::Unencodable { .. }));
    }

    #[test]
    fn encode_hex_tokens() {
        assert_eq!(
            CharsetMode::None.encode("05 0D a0").unwrap(),
            vec![0x05, 0x0d, 0xa0]
        );
        // Leading zeros are optional per token.
        assert_eq!(CharsetMode::None.encode("5 d").unwrap(), vec![0x05, 0x0d]);
    }

    #[test]
    fn encode_hex_empty_text_is_empty_payload() {
        assert_eq!(CharsetMode::None.encode("").unwrap(), Vec::<u8>::new());
        assert_eq!(CharsetMode::None.encode("   ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_hex_bad_token_fails() {
        assert!(matches!(
            CharsetMode::None.encode("41 zz").unwrap_err(),
            FrameError::HexToken { .. }
        ));
        // Three hex digits exceed one byte.
        assert!(matches!(
            CharsetMode::None.encode("1ff").unwrap_err(),
            FrameError::HexToken { .. }
        ));
    }

    #[test]
    fn hex_round_trip_normalizes() {
        let bytes = parse_hex_tokens("5  A\tff").unwrap();
        assert_eq!(hex_string(&bytes), "05 0a ff");
    }

    #[test]
    fn default_is_utf8() {
        assert_eq!(CharsetMode::default().label(), "UTF-8");
    }
}
