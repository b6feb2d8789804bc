//! Seams to the host object model.
//!
//! The replicator never knows concrete actor types. It asks an
//! [`ObjectModel`] about validity and ownership, and delivers calls and
//! notifications through [`Invocable`].

use schema::{ObjectRef, TypedValue};

use crate::peer::PeerId;

/// Arguments of a call delivered for local execution.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs<'a> {
    /// Caller-marshalled payload, passed through untouched.
    Raw(&'a [u8]),
    /// Arguments decoded from a typed signature, in order.
    Typed(Vec<TypedValue>),
}

/// A call being executed on this machine.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCall<'a> {
    pub object: ObjectRef,
    /// Operation name without any argument tags.
    pub name: &'a str,
    pub args: CallArgs<'a>,
    /// The channel the call arrived on; `None` for calls made here.
    pub origin: Option<PeerId>,
}

/// An object that accepts routed calls and replication notifications.
pub trait Invocable {
    /// Executes an application call.
    fn invoke(&mut self, call: &LocalCall<'_>);

    /// Fires once, when the actor has begun play and holds its initial state.
    fn on_replicated(&mut self) {}

    /// Fires for each sync received after [`on_replicated`](Self::on_replicated),
    /// with the names in payload order.
    fn on_properties_changed(&mut self, names: &[String]) {
        let _ = names;
    }
}

/// Authority and object-lifetime queries answered by the embedding engine.
pub trait ObjectModel {
    /// Returns `false` for unknown or destroyed objects.
    fn is_valid(&self, object: ObjectRef) -> bool;

    /// Returns `false` for actors that never replicate; their calls run
    /// locally only.
    fn is_replicated(&self, object: ObjectRef) -> bool;

    /// Returns the peer that owns `object`, or `None` if nobody does.
    fn owner_of(&self, object: ObjectRef) -> Option<PeerId>;

    /// Returns the call handler for `object`.
    fn invocable(&mut self, object: ObjectRef) -> Option<&mut dyn Invocable>;

    /// A channel to `peer` has opened.
    fn on_channel_open(&mut self, peer: PeerId) {
        let _ = peer;
    }

    /// The channel to `peer` is going away.
    fn on_channel_close(&mut self, peer: PeerId) {
        let _ = peer;
    }
}
