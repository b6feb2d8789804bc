//! Destination flags for routed calls.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of destinations a routed call should execute on.
///
/// Combine with `|`. [`Where::NOWHERE`] is the empty set and is rejected by
/// the router. [`Where::INTERNAL`] is not a destination: it marks protocol
/// traffic (property sync) so the receiver hands it to the sync handler
/// instead of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Where(u8);

impl Where {
    /// No destination.
    pub const NOWHERE: Self = Self(0);
    /// The calling machine.
    pub const LOCAL: Self = Self(1 << 0);
    /// The authoritative host.
    pub const HOST: Self = Self(1 << 1);
    /// The machine owning the target object.
    pub const OWNER: Self = Self(1 << 2);
    /// Every machine that does not own the target object.
    pub const NON_OWNERS: Self = Self(1 << 3);
    /// Protocol-internal traffic marker.
    pub const INTERNAL: Self = Self(1 << 7);

    /// Every remote-capable destination.
    pub const ALL: Self = Self(Self::HOST.0 | Self::OWNER.0 | Self::NON_OWNERS.0);
    /// Every destination including the caller.
    pub const EVERYWHERE: Self = Self(Self::LOCAL.0 | Self::ALL.0);

    /// Reserved bits mask (must be zero).
    const RESERVED_MASK: u8 = !(Self::EVERYWHERE.0 | Self::INTERNAL.0);

    /// Creates flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns only the `INTERNAL` bit of these flags.
    #[must_use]
    pub const fn internal_part(self) -> Self {
        Self(self.0 & Self::INTERNAL.0)
    }

    /// Returns `true` if no destination bit is set.
    ///
    /// `INTERNAL` alone still counts as nowhere.
    #[must_use]
    pub const fn is_nowhere(self) -> bool {
        self.0 & Self::EVERYWHERE.0 == 0
    }

    #[must_use]
    pub const fn is_internal(self) -> bool {
        self.contains(Self::INTERNAL)
    }

    /// Returns `true` if no reserved bits are set.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 & Self::RESERVED_MASK == 0
    }
}

impl BitOr for Where {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Where {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Where, &str); 5] = [
            (Where::LOCAL, "LOCAL"),
            (Where::HOST, "HOST"),
            (Where::OWNER, "OWNER"),
            (Where::NON_OWNERS, "NON_OWNERS"),
            (Where::INTERNAL, "INTERNAL"),
        ];
        if self.0 == 0 {
            return f.write_str("NOWHERE");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let reserved = self.0 & Self::RESERVED_MASK;
        if reserved != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "0x{reserved:02X}")?;
        }
        Ok(())
    }
}
