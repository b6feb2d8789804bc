//! Destination planning for routed calls.
//!
//! [`plan_route`] is a pure function of the requested flags, this machine's
//! role and whether this machine owns the target. The replicator turns the
//! plan into channel sends and a local dispatch, sends first.

use wire::Where;

use crate::peer::NetMode;

/// What one routed call does on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    /// Execute on this machine.
    pub local: bool,
    /// Flags to send upstream to the host (clients only).
    pub to_host: Option<Where>,
    /// Send to the owning client's channel (host only).
    pub to_owner: bool,
    /// Send to every channel whose peer does not own the target (host only).
    pub to_non_owners: bool,
    /// Flags carried by messages the host sends downstream.
    pub downstream: Where,
}

impl RoutePlan {
    /// Returns `true` if the plan produces any wire traffic.
    #[must_use]
    pub const fn sends(&self) -> bool {
        self.to_host.is_some() || self.to_owner || self.to_non_owners
    }
}

/// Decides local execution and forwarding for `flags`.
///
/// `INTERNAL` never affects the destinations; it is carried into every
/// forwarded flag set when present and never added when absent.
#[must_use]
pub fn plan_route(flags: Where, mode: NetMode, is_owner: bool) -> RoutePlan {
    let internal = flags.internal_part();
    let owner_wanted = flags.contains(Where::OWNER);
    let non_owners_wanted = flags.contains(Where::NON_OWNERS);
    let as_owner = owner_wanted && is_owner;
    let as_non_owner = non_owners_wanted && !is_owner;
    let downstream = Where::LOCAL | internal;

    match mode {
        NetMode::Host | NetMode::Standalone => {
            let connected = mode == NetMode::Host;
            RoutePlan {
                local: flags.contains(Where::LOCAL)
                    || flags.contains(Where::HOST)
                    || as_owner
                    || as_non_owner,
                to_host: None,
                to_owner: connected && owner_wanted && !is_owner,
                to_non_owners: connected && non_owners_wanted,
                downstream,
            }
        }
        NetMode::Client => {
            let mut upstream = Where::NOWHERE;
            if flags.contains(Where::HOST) {
                upstream |= Where::LOCAL;
            }
            if owner_wanted && !is_owner {
                upstream |= Where::OWNER;
            }
            if non_owners_wanted {
                upstream |= Where::NON_OWNERS;
            }
            RoutePlan {
                local: flags.contains(Where::LOCAL) || as_owner || as_non_owner,
                to_host: (!upstream.is_nowhere()).then_some(upstream | internal),
                to_owner: false,
                to_non_owners: false,
                downstream,
            }
        }
    }
}
