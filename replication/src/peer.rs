//! Machine identity and role.

use std::fmt;

/// Identifies a machine in a session.
///
/// The host is always peer 0; clients take the channel id the host assigned
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerId(u32);

impl PeerId {
    pub const HOST: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_host(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_host() {
            write!(f, "peer:host")
        } else {
            write!(f, "peer:{}", self.0)
        }
    }
}

/// How this machine takes part in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetMode {
    /// Single machine with no connections; only local execution happens.
    Standalone,
    /// The authority. Accepts client channels.
    Host,
    /// Connected upstream to a host.
    Client,
}

impl NetMode {
    /// Returns `true` if this machine's state is canonical.
    #[must_use]
    pub const fn is_authority(self) -> bool {
        matches!(self, Self::Standalone | Self::Host)
    }
}

impl fmt::Display for NetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standalone => "standalone",
            Self::Host => "host",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_zero() {
        assert!(PeerId::HOST.is_host());
        assert!(!PeerId::new(3).is_host());
        assert_eq!(PeerId::HOST.to_string(), "peer:host");
        assert_eq!(PeerId::new(3).to_string(), "peer:3");
    }

    #[test]
    fn authority_modes() {
        assert!(NetMode::Host.is_authority());
        assert!(NetMode::Standalone.is_authority());
        assert!(!NetMode::Client.is_authority());
    }
}
