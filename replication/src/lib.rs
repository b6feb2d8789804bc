//! Call routing and actor property replication for netrep.
//!
//! A [`Replicator`] runs on every machine of a session: the host, each
//! client, or a single standalone process. Application code asks it to run
//! a named call on an object at a set of destinations ([`Where`]); the
//! replicator decides which parts run here, which go out over which
//! [`Channel`], and relays calls that clients send through the host.
//!
//! Replicated properties ride on the same path as a reserved internal call,
//! so property syncs and application calls share one ordering per channel.
//!
//! # Design Principles
//!
//! - **Sends before local execution** - A call's wire messages are queued
//!   before any local handler runs.
//! - **Per-channel ordering** - Messages leave and are dispatched in the
//!   order they were queued or received.
//! - **Engine at arm's length** - Object validity, ownership and call
//!   handlers come through [`ObjectModel`] and [`Invocable`].
//! - **Single-threaded** - Everything happens inside caller-driven
//!   operations and [`Replicator::tick`].

mod actor;
mod channel;
mod config;
mod error;
mod model;
mod peer;
mod replicator;
mod routing;
mod signatures;
mod throttle;
mod transport;

pub use actor::{ActorReplication, ActorState, ReplicationEvent};
pub use channel::{Channel, ChannelState, Enqueued, InboundCall};
pub use config::{CallOptions, ReplicationConfig};
pub use error::{ReplicationError, ReplicationResult};
pub use model::{CallArgs, Invocable, LocalCall, ObjectModel};
pub use peer::{NetMode, PeerId};
pub use replicator::{Replicator, UNREGISTER_SIGNATURE};
pub use routing::{plan_route, RoutePlan};
pub use signatures::{InboundSignatures, OutboundSignatures};
pub use throttle::Throttle;
pub use transport::{MemoryTransport, Transport};

pub use wire::Where;
