//! Configurable limits for bounded decoding.

/// Wire-level limits for channel message encoding and decoding.
///
/// These limits are enforced on both ends to bound memory use per message.
/// Limits on what a call payload contains belong to higher layers (codec).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum size of one encoded channel message in bytes.
    pub max_message_bytes: usize,

    /// Maximum length of a signature string in bytes.
    pub max_signature_len: usize,

    /// Maximum size of a call payload in bytes.
    pub max_payload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_bytes: 64 * 1024,
            max_signature_len: 1024,
            max_payload_bytes: 60 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_message_bytes: 4096,
            max_signature_len: 128,
            max_payload_bytes: 2048,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_message_bytes: usize::MAX,
            max_signature_len: usize::MAX,
            max_payload_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_message_bytes, 64 * 1024);
        assert!(limits.max_payload_bytes < limits.max_message_bytes);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_message_bytes < default_limits.max_message_bytes);
        assert!(test_limits.max_signature_len < default_limits.max_signature_len);
        assert!(test_limits.max_payload_bytes < default_limits.max_payload_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_message_bytes, usize::MAX);
        assert_eq!(limits.max_signature_len, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_message_bytes, 4096);
    }
}
