//! Error types for wire format operations.

use std::fmt;

use bitstream::ByteError;

/// Result type for wire decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Decode errors for channel message framing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Message contained no bytes.
    EmptyMessage,

    /// Unknown message kind byte.
    UnknownKind { kind: u8 },

    /// Destination flags carry reserved bits.
    InvalidFlags { flags: u8 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Bytes left over after a fixed-size message body.
    TrailingBytes { remaining: usize },

    /// Underlying byte read failed (truncation, bad UTF-8).
    Bytes(ByteError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    MessageBytes,
    SignatureLength,
    PayloadBytes,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
    LengthOverflow { length: usize },
}

impl From<ByteError> for DecodeError {
    fn from(err: ByteError) -> Self {
        Self::Bytes(err)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownKind { kind } => write!(f, "unknown message kind: {kind}"),
            Self::InvalidFlags { flags } => write!(f, "invalid destination flags: 0x{flags:02X}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::TrailingBytes { remaining } => {
                write!(f, "{remaining} trailing bytes after message body")
            }
            Self::Bytes(err) => write!(f, "malformed message: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageBytes => "message bytes",
            Self::SignatureLength => "signature length",
            Self::PayloadBytes => "payload bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::LengthOverflow { length } => {
                write!(f, "length overflow: {length}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_unknown_kind() {
        let err = DecodeError::UnknownKind { kind: 9 };
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn decode_error_display_limits_exceeded() {
        let err = DecodeError::LimitsExceeded {
            kind: LimitKind::SignatureLength,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("signature length"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn decode_error_wraps_bytes() {
        let err: DecodeError = ByteError::UnexpectedEof {
            requested: 4,
            available: 0,
        }
        .into();
        assert!(matches!(err, DecodeError::Bytes(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::LimitsExceeded {
            kind: LimitKind::PayloadBytes,
            limit: 8,
            actual: 9,
        };
        assert!(err.to_string().contains("payload bytes"));
    }
}
