//! Network object identifiers.

use std::fmt;

/// Identifier for an object across a connection graph.
///
/// Zero is reserved for the null reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetGuid(u32);

impl NetGuid {
    /// The null reference.
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for NetGuid {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<NetGuid> for u32 {
    fn from(value: NetGuid) -> Self {
        value.raw()
    }
}

impl fmt::Display for NetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guid:{}", self.0)
    }
}
