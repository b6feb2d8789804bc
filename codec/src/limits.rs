//! Limits for codec-level encoding and decoding.

/// Codec-specific limits enforced on call arguments and sync payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum length of a string value in bytes.
    pub max_string_len: usize,
    /// Maximum length of a byte-string value.
    pub max_bytes_len: usize,
    /// Maximum number of `(index, value)` entries in one sync payload.
    pub max_update_entries: usize,
    /// Maximum number of arguments in a typed call.
    pub max_call_args: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_string_len: usize::from(u16::MAX),
            max_bytes_len: 32 * 1024,
            max_update_entries: 4096,
            max_call_args: 64,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_len: 256,
            max_bytes_len: 1024,
            max_update_entries: 64,
            max_call_args: 16,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_len: usize::MAX,
            max_bytes_len: usize::MAX,
            max_update_entries: usize::MAX,
            max_call_args: usize::MAX,
        }
    }
}
