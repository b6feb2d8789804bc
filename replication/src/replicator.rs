//! The per-machine replication session.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use codec::{
    check_call_name, decode_args, decode_update, encode_args, encode_changes, encode_snapshot,
    GuidCache, GuidRegistry, Signature, SnapshotKind, UPDATE_SIGNATURE,
};
use log::{debug, error, info, warn};
use schema::{property_set_hash, ObjectRef, PropertySet, TypedValue};
use wire::{check_call_fits, Where};

use crate::actor::{ActorReplication, ActorState, ReplicationEvent};
use crate::channel::{Channel, Enqueued};
use crate::config::{CallOptions, ReplicationConfig};
use crate::error::{ReplicationError, ReplicationResult};
use crate::model::{CallArgs, LocalCall, ObjectModel};
use crate::peer::{NetMode, PeerId};
use crate::routing::plan_route;
use crate::transport::Transport;

/// Internal call a host sends when an actor's properties go away.
pub const UNREGISTER_SIGNATURE: &str = "__nrunregister__";

/// Routes calls and property syncs for one machine.
///
/// Everything runs on the caller's thread. Calls and updates queue their
/// wire messages immediately and execute locally afterwards; queued messages
/// leave on the next [`tick`](Self::tick), which also dispatches whatever
/// arrived since the previous one.
///
/// Local handlers run while the replicator is borrowed, so a handler that
/// wants to make further calls hands them back to its caller to issue after
/// the current operation returns.
///
/// A call or update that cannot be encoded within the wire limits fails
/// before anything is queued or executed. When one destination cannot be
/// reached (a missing or closed channel, a full signature table) the other
/// destinations and local execution still go ahead and the first such error
/// is returned.
#[derive(Debug)]
pub struct Replicator {
    mode: NetMode,
    config: ReplicationConfig,
    local_peer: Option<PeerId>,
    channels: BTreeMap<PeerId, Channel>,
    guids: GuidRegistry,
    actors: HashMap<ObjectRef, ActorReplication>,
    next_spawn_order: u64,
    now: Duration,
}

impl Replicator {
    /// Creates a session with a process-local guid table.
    ///
    /// Authorities know their identity up front; a client learns it from
    /// the host's `Init`.
    #[must_use]
    pub fn new(mode: NetMode, config: ReplicationConfig) -> Self {
        Self {
            mode,
            config,
            local_peer: mode.is_authority().then_some(PeerId::HOST),
            channels: BTreeMap::new(),
            guids: GuidRegistry::local(),
            actors: HashMap::new(),
            next_spawn_order: 0,
            now: Duration::ZERO,
        }
    }

    /// Uses the connection layer's guid cache instead of a local table.
    #[must_use]
    pub fn with_guid_cache(mut self, cache: impl GuidCache + 'static) -> Self {
        self.guids = GuidRegistry::authoritative(cache);
        self
    }

    #[must_use]
    pub const fn mode(&self) -> NetMode {
        self.mode
    }

    #[must_use]
    pub const fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    /// This machine's identity, once known.
    #[must_use]
    pub const fn local_peer(&self) -> Option<PeerId> {
        self.local_peer
    }

    #[must_use]
    pub const fn guids(&self) -> &GuidRegistry {
        &self.guids
    }

    /// Peers with an open channel, in id order.
    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.channels.keys().copied()
    }

    #[must_use]
    pub fn channel(&self, peer: PeerId) -> Option<&Channel> {
        self.channels.get(&peer)
    }

    #[must_use]
    pub fn actor_state(&self, object: ObjectRef) -> ActorState {
        self.actors
            .get(&object)
            .map_or(ActorState::Unregistered, ActorReplication::state)
    }

    /// The replicated properties of an actor. Writes go through
    /// [`update`](Self::update).
    #[must_use]
    pub fn properties(&self, object: ObjectRef) -> Option<&PropertySet> {
        self.actors.get(&object).map(ActorReplication::properties)
    }

    #[must_use]
    pub fn property(&self, object: ObjectRef, name: &str) -> Option<&TypedValue> {
        self.properties(object).and_then(|set| set.value(name))
    }

    /// Routes a call with a caller-marshalled payload.
    ///
    /// `signature` is the bare operation name; it may not contain the
    /// argument tag separator.
    pub fn call(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        flags: Where,
        signature: &str,
        payload: &[u8],
        options: CallOptions,
    ) -> ReplicationResult<()> {
        validate(model, object, flags)?;
        check_call_name(signature).map_err(|err| {
            error!("rejecting call for object {}: {err}", object.raw());
            err
        })?;
        self.route(model, object, flags, signature, payload, options, None)
    }

    /// Routes a call whose arguments are marshalled here.
    ///
    /// The call travels as `name|T1,T2,...` and the receiver gets the
    /// decoded arguments.
    pub fn call_typed(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        flags: Where,
        name: &str,
        args: &[TypedValue],
        options: CallOptions,
    ) -> ReplicationResult<()> {
        validate(model, object, flags)?;
        let (signature, payload) = encode_args(name, args, &mut self.guids, &self.config.codec)
            .map_err(|err| {
                error!("failed to marshal arguments for {name}: {err}");
                err
            })?;
        self.route(model, object, flags, &signature, &payload, options, None)
    }

    /// Declares an actor's replicated properties.
    ///
    /// A host announces the explicitly overridden values to every client, a
    /// standalone machine applies them locally and a client only records
    /// the layout. Registering again replaces the properties but keeps the
    /// actor's spawn position.
    pub fn register_properties(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        properties: PropertySet,
    ) -> ReplicationResult<()> {
        if !model.is_valid(object) {
            error!("cannot register properties of invalid object {}", object.raw());
            return Err(ReplicationError::InvalidObject { object });
        }

        let flags = match self.mode {
            NetMode::Host => Some(Where::OWNER | Where::NON_OWNERS),
            NetMode::Standalone => Some(Where::LOCAL),
            NetMode::Client => None,
        };
        let payload = match flags {
            Some(_) => Some(encode_snapshot(
                &properties,
                SnapshotKind::OverridesOnly,
                &mut self.guids,
                &self.config.codec,
            )?),
            None => None,
        };
        if let (NetMode::Host, Some(payload)) = (self.mode, &payload) {
            check_call_fits(UPDATE_SIGNATURE, payload, &self.config.wire)?;
        }

        let spawn_order = match self.actors.get(&object) {
            Some(actor) => actor.spawn_order(),
            None => {
                let order = self.next_spawn_order;
                self.next_spawn_order += 1;
                order
            }
        };
        debug!(
            "registered {} properties on object {} (spawn order {spawn_order})",
            properties.len(),
            object.raw()
        );
        self.actors
            .insert(object, ActorReplication::new(properties, spawn_order));

        if let (Some(flags), Some(payload)) = (flags, payload) {
            self.route(
                model,
                object,
                flags | Where::INTERNAL,
                UPDATE_SIGNATURE,
                &payload,
                CallOptions::default(),
                None,
            )?;
        }
        Ok(())
    }

    /// Drops an actor's replicated properties.
    ///
    /// A host also tells every client to drop theirs, and the actor leaves
    /// the snapshots sent to late joiners. Call this before the object is
    /// destroyed so the model can still answer for it.
    pub fn unregister(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
    ) -> ReplicationResult<()> {
        if self.actors.remove(&object).is_none() {
            return Err(ReplicationError::NotRegistered { object });
        }
        debug!("unregistered object {}", object.raw());

        if self.mode == NetMode::Host && model.is_valid(object) && model.is_replicated(object) {
            self.route(
                model,
                object,
                Where::OWNER | Where::NON_OWNERS | Where::INTERNAL,
                UNREGISTER_SIGNATURE,
                &[],
                CallOptions::default(),
                None,
            )?;
        }
        Ok(())
    }

    /// Records that the actor has begun play.
    pub fn note_begin_play(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
    ) -> ReplicationResult<()> {
        let authority = self.mode.is_authority();
        let actor = self
            .actors
            .get_mut(&object)
            .ok_or(ReplicationError::NotRegistered { object })?;
        if let Some(event) = actor.begin_play(authority) {
            notify(model, object, event);
        }
        Ok(())
    }

    /// Changes replicated properties by routing a sync like any other call.
    ///
    /// Values are coerced to their declared types; nothing is sent if any
    /// of them fails.
    pub fn update(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        flags: Where,
        initial: bool,
        changes: &[(&str, TypedValue)],
        options: CallOptions,
    ) -> ReplicationResult<()> {
        validate(model, object, flags)?;
        let actor = self.actors.get(&object).ok_or_else(|| {
            error!("update for object {} without registered properties", object.raw());
            ReplicationError::NotRegistered { object }
        })?;
        let payload = encode_changes(
            actor.properties(),
            changes,
            initial,
            &mut self.guids,
            &self.config.codec,
        )
        .map_err(|err| {
            error!("failed to marshal update for object {}: {err}", object.raw());
            err
        })?;
        self.route(
            model,
            object,
            flags | Where::INTERNAL,
            UPDATE_SIGNATURE,
            &payload,
            options,
            None,
        )
    }

    /// Opens a channel to a newly connected client (host only).
    ///
    /// The client gets the lowest free id, then its `Init`, then a full
    /// snapshot of every replicated actor in spawn order.
    pub fn open_client_channel(
        &mut self,
        model: &mut dyn ObjectModel,
        transport: impl Transport + 'static,
    ) -> ReplicationResult<PeerId> {
        if self.mode != NetMode::Host {
            return Err(ReplicationError::UnsupportedMode {
                mode: self.mode,
                operation: "open_client_channel",
            });
        }
        let peer = (1..=u32::MAX)
            .map(PeerId::new)
            .find(|peer| !self.channels.contains_key(peer))
            .ok_or(ReplicationError::PeerIdsExhausted)?;

        let mut channel = Channel::new(peer, Box::new(transport), &self.config);
        channel.enqueue_init(peer.raw())?;
        self.channels.insert(peer, channel);
        info!("opened channel to {peer}");
        model.on_channel_open(peer);

        self.send_snapshots(model, peer);
        Ok(peer)
    }

    /// Opens the channel to the host (client only).
    pub fn open_host_channel(
        &mut self,
        model: &mut dyn ObjectModel,
        transport: impl Transport + 'static,
    ) -> ReplicationResult<()> {
        if self.mode != NetMode::Client {
            return Err(ReplicationError::UnsupportedMode {
                mode: self.mode,
                operation: "open_host_channel",
            });
        }
        if self.channels.contains_key(&PeerId::HOST) {
            return Err(ReplicationError::ChannelAlreadyOpen {
                peer: PeerId::HOST,
            });
        }
        let channel = Channel::new(PeerId::HOST, Box::new(transport), &self.config);
        self.channels.insert(PeerId::HOST, channel);
        info!("opened channel to {}", PeerId::HOST);
        model.on_channel_open(PeerId::HOST);
        Ok(())
    }

    /// Closes a channel, discarding anything it had not sent.
    pub fn close_channel(
        &mut self,
        model: &mut dyn ObjectModel,
        peer: PeerId,
    ) -> ReplicationResult<()> {
        let mut channel = self
            .channels
            .remove(&peer)
            .ok_or(ReplicationError::MissingChannel { peer })?;
        model.on_channel_close(peer);
        channel.close();
        if self.mode == NetMode::Client && peer.is_host() {
            self.local_peer = None;
        }
        Ok(())
    }

    /// Advances the session: receives, dispatches, then flushes.
    pub fn tick(&mut self, model: &mut dyn ObjectModel, now: Duration) {
        self.now = now;
        let peers: Vec<PeerId> = self.channels.keys().copied().collect();

        for &peer in &peers {
            let Some(channel) = self.channels.get_mut(&peer) else {
                continue;
            };
            for channel_id in channel.poll() {
                self.handle_init(peer, channel_id);
            }
        }

        for &peer in &peers {
            let Some(channel) = self.channels.get_mut(&peer) else {
                continue;
            };
            for bytes in channel.take_inbound() {
                if let Err(err) = self.receive(model, peer, &bytes) {
                    error!("{peer}: failed to handle message: {err}");
                }
            }
        }

        for channel in self.channels.values_mut() {
            channel.flush();
        }
    }

    fn handle_init(&mut self, origin: PeerId, channel_id: u32) {
        if self.mode != NetMode::Client || !origin.is_host() {
            warn!("{origin}: ignoring unexpected init");
            return;
        }
        let identity = PeerId::new(channel_id);
        info!("host assigned identity {identity}");
        self.local_peer = Some(identity);
    }

    fn receive(
        &mut self,
        model: &mut dyn ObjectModel,
        origin: PeerId,
        bytes: &[u8],
    ) -> ReplicationResult<()> {
        let channel = self
            .channels
            .get_mut(&origin)
            .ok_or(ReplicationError::MissingChannel { peer: origin })?;
        let Some(call) = channel.read(bytes)? else {
            return Ok(());
        };

        let Some(object) = self.guids.resolve(call.recipient) else {
            if call.flags.is_internal() {
                warn!(
                    "{origin}: {} for unknown {}, dropped",
                    call.signature, call.recipient
                );
                return Ok(());
            }
            return Err(ReplicationError::UnknownRecipient {
                guid: call.recipient,
            });
        };
        debug!(
            "{origin}: received {} for object {} with {}",
            call.signature,
            object.raw(),
            call.flags
        );

        if self.mode == NetMode::Client {
            if call.flags.is_internal() && call.signature == UNREGISTER_SIGNATURE {
                self.forget(object);
                return Ok(());
            }
            if !model.is_valid(object) {
                return Err(ReplicationError::InvalidObject { object });
            }
            if call.flags.contains(Where::LOCAL) {
                self.execute_local(
                    model,
                    object,
                    call.flags.is_internal(),
                    &call.signature,
                    call.payload,
                    Some(origin),
                );
            }
            return Ok(());
        }

        validate(model, object, call.flags)?;
        self.route(
            model,
            object,
            call.flags,
            &call.signature,
            call.payload,
            CallOptions::default(),
            Some(origin),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn route(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        flags: Where,
        signature: &str,
        payload: &[u8],
        options: CallOptions,
        origin: Option<PeerId>,
    ) -> ReplicationResult<()> {
        let Some(local_peer) = self.local_peer else {
            warn!(
                "no local identity yet, dropping {signature} for object {}",
                object.raw()
            );
            return Ok(());
        };
        let flags = if model.is_replicated(object) {
            flags
        } else {
            Where::LOCAL | flags.internal_part()
        };
        let owner = model.owner_of(object);
        let plan = plan_route(flags, self.mode, owner == Some(local_peer));
        debug!(
            "routing {signature} for object {} with {flags}: {plan:?}",
            object.raw()
        );
        if plan.sends() {
            check_call_fits(signature, payload, &self.config.wire).map_err(|err| {
                error!(
                    "{signature} for object {} does not fit in a message: {err}",
                    object.raw()
                );
                err
            })?;
        }

        let mut result = Ok(());
        if let Some(upstream) = plan.to_host {
            result = result.and(self.send(
                PeerId::HOST,
                upstream,
                object,
                signature,
                payload,
                options,
            ));
        }
        if plan.to_owner {
            match owner {
                Some(peer) if Some(peer) == origin => {}
                Some(peer) => {
                    result = result.and(self.send(
                        peer,
                        plan.downstream,
                        object,
                        signature,
                        payload,
                        options,
                    ));
                }
                None => warn!(
                    "{signature}: object {} has no owning connection",
                    object.raw()
                ),
            }
        }
        if plan.to_non_owners {
            let targets: Vec<PeerId> = self
                .channels
                .keys()
                .copied()
                .filter(|peer| Some(*peer) != owner && Some(*peer) != origin)
                .collect();
            for peer in targets {
                result = result.and(self.send(
                    peer,
                    plan.downstream,
                    object,
                    signature,
                    payload,
                    options,
                ));
            }
        }

        if plan.local {
            self.execute_local(
                model,
                object,
                flags.is_internal(),
                signature,
                payload,
                origin,
            );
        }
        result
    }

    fn send(
        &mut self,
        peer: PeerId,
        flags: Where,
        object: ObjectRef,
        signature: &str,
        payload: &[u8],
        options: CallOptions,
    ) -> ReplicationResult<()> {
        self.try_send(peer, flags, object, signature, payload, options)
            .map(|_| ())
            .map_err(|err| {
                error!("failed to send {signature} to {peer}: {err}");
                err
            })
    }

    fn try_send(
        &mut self,
        peer: PeerId,
        flags: Where,
        object: ObjectRef,
        signature: &str,
        payload: &[u8],
        options: CallOptions,
    ) -> ReplicationResult<Enqueued> {
        let channel = self
            .channels
            .get_mut(&peer)
            .ok_or(ReplicationError::MissingChannel { peer })?;
        let recipient = self.guids.get_or_assign(object)?;
        channel.enqueue_call(flags, recipient, signature, payload, options, self.now)
    }

    fn execute_local(
        &mut self,
        model: &mut dyn ObjectModel,
        object: ObjectRef,
        internal: bool,
        signature: &str,
        payload: &[u8],
        origin: Option<PeerId>,
    ) {
        if internal {
            if signature == UPDATE_SIGNATURE {
                self.apply_sync(model, object, payload);
            } else if signature == UNREGISTER_SIGNATURE {
                self.forget(object);
            } else {
                error!("no handler for internal call {signature}");
            }
            return;
        }

        let parsed = match Signature::parse(signature) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("dropping call: {err}");
                return;
            }
        };
        let args = match parsed.arg_tags() {
            Some(tags) => match decode_args(tags, payload, &self.guids, &self.config.codec) {
                Ok(args) => CallArgs::Typed(args),
                Err(err) => {
                    error!("dropping {signature}: {err}");
                    return;
                }
            },
            None => CallArgs::Raw(payload),
        };
        let call = LocalCall {
            object,
            name: parsed.name(),
            args,
            origin,
        };
        match model.invocable(object) {
            Some(target) => target.invoke(&call),
            None => warn!("object {} has no handler for {}", object.raw(), call.name),
        }
    }

    fn apply_sync(&mut self, model: &mut dyn ObjectModel, object: ObjectRef, payload: &[u8]) {
        let Some(actor) = self.actors.get_mut(&object) else {
            warn!("property sync for unregistered object {}", object.raw());
            return;
        };
        let result = decode_update(actor.properties(), payload, &self.guids, &self.config.codec)
            .and_then(|update| actor.apply_sync(update));
        match result {
            Ok(Some(event)) => notify(model, object, event),
            Ok(None) => {}
            Err(err) => error!(
                "dropping property sync for object {}: {err} (local layout {:016x})",
                object.raw(),
                property_set_hash(actor.properties())
            ),
        }
    }

    fn forget(&mut self, object: ObjectRef) {
        if self.actors.remove(&object).is_some() {
            debug!("dropped replicated properties of object {}", object.raw());
        }
    }

    fn send_snapshots(&mut self, model: &dyn ObjectModel, peer: PeerId) {
        let mut order: Vec<(u64, ObjectRef)> = self
            .actors
            .iter()
            .map(|(object, actor)| (actor.spawn_order(), *object))
            .collect();
        order.sort_unstable();

        let mut sent = 0usize;
        for (_, object) in order {
            if !model.is_valid(object) || !model.is_replicated(object) {
                continue;
            }
            let Some(actor) = self.actors.get(&object) else {
                continue;
            };
            let payload = match encode_snapshot(
                actor.properties(),
                SnapshotKind::Full,
                &mut self.guids,
                &self.config.codec,
            ) {
                Ok(payload) => payload,
                Err(err) => {
                    error!("failed to snapshot object {}: {err}", object.raw());
                    continue;
                }
            };
            match self.try_send(
                peer,
                Where::LOCAL | Where::INTERNAL,
                object,
                UPDATE_SIGNATURE,
                &payload,
                CallOptions::default(),
            ) {
                Ok(_) => sent += 1,
                Err(err) => error!("failed to send snapshot of object {} to {peer}: {err}", object.raw()),
            }
        }
        info!("sent {sent} actor snapshots to {peer}");
    }
}

fn validate(model: &dyn ObjectModel, object: ObjectRef, flags: Where) -> ReplicationResult<()> {
    if flags.is_nowhere() {
        error!("call for object {} has no destination", object.raw());
        return Err(ReplicationError::NowhereFlags);
    }
    if !model.is_valid(object) {
        error!("call target {} is invalid or destroyed", object.raw());
        return Err(ReplicationError::InvalidObject { object });
    }
    Ok(())
}

fn notify(model: &mut dyn ObjectModel, object: ObjectRef, event: ReplicationEvent) {
    let Some(target) = model.invocable(object) else {
        debug!("object {} has no handler for {event:?}", object.raw());
        return;
    };
    match event {
        ReplicationEvent::Replicated => target.on_replicated(),
        ReplicationEvent::PropertiesChanged(names) => target.on_properties_changed(&names),
    }
}
