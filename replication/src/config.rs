//! Session configuration and per-call options.

use codec::CodecLimits;
use wire::Limits;

/// Configuration for a [`Replicator`](crate::Replicator).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicationConfig {
    /// Channel message framing limits.
    pub wire: Limits,
    /// Value and payload limits.
    pub codec: CodecLimits,
    /// Outbound queue length at which a warning is logged.
    ///
    /// Messages are never dropped because of back-pressure.
    pub backlog_warning: usize,
    /// Signature ids available per channel direction (at most 65536).
    pub max_signatures: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            wire: Limits::default(),
            codec: CodecLimits::default(),
            backlog_warning: 1024,
            max_signatures: 4096,
        }
    }
}

impl ReplicationConfig {
    /// Creates a configuration with small limits for tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            wire: Limits::for_testing(),
            codec: CodecLimits::for_testing(),
            backlog_warning: 16,
            max_signatures: 32,
        }
    }
}

/// Delivery options for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallOptions {
    /// Ask the transport for reliable delivery.
    pub reliable: bool,
    /// Drop calls to the same recipient and signature arriving faster than
    /// this rate. `None` disables throttling.
    pub max_calls_per_sec: Option<u32>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::reliable()
    }
}

impl CallOptions {
    #[must_use]
    pub const fn reliable() -> Self {
        Self {
            reliable: true,
            max_calls_per_sec: None,
        }
    }

    #[must_use]
    pub const fn unreliable() -> Self {
        Self {
            reliable: false,
            max_calls_per_sec: None,
        }
    }

    #[must_use]
    pub const fn with_reliable(self, reliable: bool) -> Self {
        Self { reliable, ..self }
    }

    #[must_use]
    pub const fn with_rate_limit(self, max_calls_per_sec: u32) -> Self {
        Self {
            max_calls_per_sec: Some(max_calls_per_sec),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_default_to_reliable_unthrottled() {
        let options = CallOptions::default();
        assert!(options.reliable);
        assert_eq!(options.max_calls_per_sec, None);
    }

    #[test]
    fn builder_sets_fields() {
        let options = CallOptions::unreliable().with_rate_limit(10);
        assert!(!options.reliable);
        assert_eq!(options.max_calls_per_sec, Some(10));
        assert!(options.with_reliable(true).reliable);
    }

    #[test]
    fn testing_config_is_smaller() {
        let test = ReplicationConfig::for_testing();
        let default = ReplicationConfig::default();
        assert!(test.backlog_warning < default.backlog_warning);
        assert!(test.max_signatures < default.max_signatures);
        assert!(default.max_signatures <= usize::from(u16::MAX) + 1);
    }
}
