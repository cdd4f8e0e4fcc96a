/// Errors from sentinel parsing and payload encoding.
///
/// Decoding inbound payloads never fails; undecodable bytes fall back to
/// the hex rendering instead.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A start/end code string did not resolve to a single byte.
    #[error("cannot parse {input:?} as a sentinel byte")]
    SentinelParse { input: String },

    /// A charset label is not recognized.
    #[error("unknown charset {label:?}")]
    UnknownCharset { label: String },

    /// A raw-mode message token did not parse as one hex byte.
    #[error("invalid hex byte token {token:?}")]
    HexToken { token: String },

    /// Message text contains characters the charset cannot represent.
    #[error("message not representable in {charset}")]
    Unencodable { charset: String },
}

pub type Result<T> = std::result::Result<T, FrameError>;
