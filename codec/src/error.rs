//! Error types for codec operations.

use std::fmt;

use bitstream::ByteError;
use schema::SchemaError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while marshalling values or sync payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// Byte-level read or write failure.
    Bytes(ByteError),

    /// Value conversion or property lookup failure.
    Schema(SchemaError),

    /// A tag spelling in a signature did not name any known type.
    UnknownTag { tag: String },

    /// A call argument has no type tag.
    UntypedArgument { index: usize },

    /// A bool slot held something other than 0 or 1.
    InvalidBool { raw: u32 },

    /// The leading initial-state byte was not 0 or 1.
    InvalidInitialFlag { raw: u8 },

    /// A received property index is not declared locally.
    ///
    /// Usually means the two ends declared different property sets.
    PropertyIndexOutOfRange { index: u16, count: usize },

    /// A sync payload ended before its end-of-properties marker.
    MissingTerminator,

    /// Bytes left over after the payload was fully decoded.
    TrailingBytes { remaining: usize },

    /// A signature string was malformed.
    InvalidSignature { signature: String },

    /// A typed payload decoded to a different number of arguments.
    ArgumentCountMismatch { expected: usize, actual: usize },

    /// Every object identifier has been handed out.
    GuidsExhausted,

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific codec limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StringLength,
    BytesLength,
    UpdateEntries,
    CallArguments,
}

impl From<ByteError> for CodecError {
    fn from(err: ByteError) -> Self {
        Self::Bytes(err)
    }
}

impl From<SchemaError> for CodecError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(e) => write!(f, "byte stream error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::UnknownTag { tag } => write!(f, "unknown type tag {tag:?}"),
            Self::UntypedArgument { index } => {
                write!(f, "argument {index} has no wire type")
            }
            Self::InvalidBool { raw } => write!(f, "invalid bool value {raw}"),
            Self::InvalidInitialFlag { raw } => {
                write!(f, "invalid initial-state flag {raw}")
            }
            Self::PropertyIndexOutOfRange { index, count } => {
                write!(
                    f,
                    "property index {index} out of range for {count} declared properties"
                )
            }
            Self::MissingTerminator => write!(f, "sync payload missing end-of-properties marker"),
            Self::TrailingBytes { remaining } => {
                write!(f, "{remaining} trailing bytes after payload")
            }
            Self::InvalidSignature { signature } => {
                write!(f, "invalid signature {signature:?}")
            }
            Self::ArgumentCountMismatch { expected, actual } => {
                write!(f, "expected {expected} arguments, got {actual}")
            }
            Self::GuidsExhausted => write!(f, "object identifier space exhausted"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StringLength => "string length",
            Self::BytesLength => "bytes length",
            Self::UpdateEntries => "update entries",
            Self::CallArguments => "call arguments",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}
