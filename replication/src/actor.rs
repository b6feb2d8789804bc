//! Per-actor replication state.

use codec::{CodecResult, PropertyUpdate};
use log::warn;
use schema::PropertySet;

/// Where an actor is in its replication lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// No properties registered.
    Unregistered,
    /// Registered, waiting for begin-play and the initial state.
    AwaitingInitialReplication,
    /// `on_replicated` has fired.
    Live,
}

/// A notification owed to the actor after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationEvent {
    /// The one-time "fully replicated" notification.
    Replicated,
    /// Properties changed after the actor went live, in payload order.
    PropertiesChanged(Vec<String>),
}

/// Property holder plus lifecycle flags for one actor.
#[derive(Debug, Clone)]
pub struct ActorReplication {
    properties: PropertySet,
    spawn_order: u64,
    begun_play: bool,
    initial_state_received: bool,
    live: bool,
}

impl ActorReplication {
    #[must_use]
    pub const fn new(properties: PropertySet, spawn_order: u64) -> Self {
        Self {
            properties,
            spawn_order,
            begun_play: false,
            initial_state_received: false,
            live: false,
        }
    }

    #[must_use]
    pub const fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Position in registration order; late joiners receive snapshots in
    /// this order.
    #[must_use]
    pub const fn spawn_order(&self) -> u64 {
        self.spawn_order
    }

    #[must_use]
    pub const fn state(&self) -> ActorState {
        if self.live {
            ActorState::Live
        } else {
            ActorState::AwaitingInitialReplication
        }
    }

    /// Records begin-play.
    ///
    /// On an authority the state is current by definition, so the actor goes
    /// live at once. A client waits for its first sync.
    pub fn begin_play(&mut self, authority: bool) -> Option<ReplicationEvent> {
        self.begun_play = true;
        if authority {
            self.initial_state_received = true;
        }
        self.go_live()
    }

    /// Applies a decoded sync and returns the notification it triggers.
    ///
    /// A failed apply changes nothing.
    pub fn apply_sync(&mut self, update: PropertyUpdate) -> CodecResult<Option<ReplicationEvent>> {
        let initial = update.initial;
        let names = update.apply(&mut self.properties)?;

        if self.initial_state_received {
            if self.live {
                return Ok(Some(ReplicationEvent::PropertiesChanged(names)));
            }
            return Ok(None);
        }
        if !initial {
            warn!("first sync for an actor was not marked as initial state");
        }
        self.initial_state_received = true;
        Ok(self.go_live())
    }

    fn go_live(&mut self) -> Option<ReplicationEvent> {
        if self.live || !self.begun_play || !self.initial_state_received {
            return None;
        }
        self.live = true;
        Some(ReplicationEvent::Replicated)
    }
}
