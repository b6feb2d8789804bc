//! Error types for byte stream operations.

use std::fmt;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur during byte-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A length prefix cannot represent the value being written.
    LengthOverflow {
        /// Length of the value in bytes.
        length: usize,
        /// Largest length the prefix can carry.
        max: usize,
    },

    /// A string field did not contain valid UTF-8.
    InvalidUtf8 {
        /// Byte offset of the string body in the buffer.
        offset: usize,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::LengthOverflow { length, max } => {
                write!(f, "length {length} exceeds prefix maximum {max}")
            }
            Self::InvalidUtf8 { offset } => {
                write!(f, "invalid utf-8 in string at byte offset {offset}")
            }
        }
    }
}

impl std::error::Error for ByteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unexpected_eof() {
        let err = ByteError::UnexpectedEof {
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 bytes"), "should mention requested bytes");
        assert!(msg.contains("1 bytes"), "should mention available bytes");
    }

    #[test]
    fn error_display_length_overflow() {
        let err = ByteError::LengthOverflow {
            length: 70_000,
            max: 65_535,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65535"));
    }

    #[test]
    fn error_display_invalid_utf8() {
        let err = ByteError::InvalidUtf8 { offset: 2 };
        assert!(err.to_string().contains("utf-8"));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<ByteError>();
    }
}
